// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog::Catalog;
use crate::db::{load_accounts, load_catalog, load_transactions};
use crate::models::{Account, Transaction, TransactionType};
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;
use std::collections::HashSet;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(
        &load_accounts(conn)?,
        &load_transactions(conn)?,
        &load_catalog(conn)?,
    );
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Integrity findings the aggregator silently tolerates.
pub fn find_issues(
    accounts: &[Account],
    transactions: &[Transaction],
    catalog: &Catalog,
) -> Vec<Vec<String>> {
    let known: HashSet<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
    let mut rows = Vec::new();

    for t in transactions {
        // 1) References to accounts that no longer exist
        if !known.contains(t.account_id.as_str()) {
            rows.push(vec![
                "orphan_account_ref".into(),
                format!("{} -> {}", t.id, t.account_id),
            ]);
        }
        // 2) Amounts must carry no sign
        if t.amount <= Decimal::ZERO {
            rows.push(vec![
                "non_positive_amount".into(),
                format!("{} {}", t.id, t.amount),
            ]);
        }
        // 3) Categories outside the catalog never show up in breakdowns
        if t.r#type != TransactionType::Transfer && catalog.find(&t.category, t.r#type).is_none() {
            rows.push(vec![
                "unknown_category".into(),
                format!("{} '{}' ({})", t.id, t.category, t.r#type),
            ]);
        }
    }
    rows
}
