// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog::Catalog;
use crate::db::{
    account_by_name, insert_transaction, load_accounts, load_catalog, load_transactions, new_id,
    transaction_by_id, update_transaction,
};
use crate::importer::amount::positive_cents;
use crate::ledger::{TransactionFilter, filter_transactions};
use crate::models::{Transaction, TransactionType};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Amounts carry no sign and must still be at least one cent once rounded.
fn checked_amount(raw: &str) -> Result<Decimal> {
    match positive_cents(parse_decimal(raw)?) {
        Some(a) => Ok(a),
        None => bail!(
            "Amount '{}' must be at least 0.01; use --type to record direction",
            raw.trim()
        ),
    }
}

/// Canonical catalog spelling of `raw` for transactions of type `t`.
fn checked_category(catalog: &Catalog, raw: &str, t: TransactionType) -> Result<String> {
    match catalog.find(raw, t) {
        Some(c) => Ok(c.name.clone()),
        None => bail!("Category '{}' not found for type {}", raw.trim(), t),
    }
}

fn notes_arg(sub: &clap::ArgMatches) -> Option<Option<String>> {
    sub.get_one::<String>("notes").map(|s| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap().trim().to_string();
    let amount = checked_amount(sub.get_one::<String>("amount").unwrap())?;
    let typ: TransactionType = sub.get_one::<String>("type").unwrap().parse()?;
    let account_name = sub.get_one::<String>("account").unwrap().trim();
    let account = account_by_name(conn, account_name)?;
    let category = checked_category(
        &load_catalog(conn)?,
        sub.get_one::<String>("category").unwrap(),
        typ,
    )?;

    let t = Transaction {
        id: new_id("txn"),
        date,
        description,
        amount,
        r#type: typ,
        category,
        account_id: account.id,
        notes: notes_arg(sub).flatten(),
        imported: false,
        is_recurring_instance: false,
        peer_transaction_id: None,
    };
    insert_transaction(conn, &t)?;
    println!(
        "Recorded {} {} on {} '{}' (acct: {})",
        t.r#type, t.amount, t.date, t.description, account_name
    );
    Ok(())
}

/// Replaces the fields given on the command line and keeps the rest. The
/// merged record passes the same checks as `add`.
fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let mut t = transaction_by_id(conn, id)?;

    if let Some(d) = sub.get_one::<String>("date") {
        t.date = parse_date(d)?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        t.description = d.trim().to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        t.amount = checked_amount(a)?;
    }
    if let Some(ty) = sub.get_one::<String>("type") {
        t.r#type = ty.parse()?;
    }
    if let Some(name) = sub.get_one::<String>("account") {
        t.account_id = account_by_name(conn, name.trim())?.id;
    }
    if let Some(notes) = notes_arg(sub) {
        t.notes = notes;
    }
    let wanted = sub
        .get_one::<String>("category")
        .cloned()
        .unwrap_or_else(|| t.category.clone());
    t.category = checked_category(&load_catalog(conn)?, &wanted, t.r#type)?;

    update_transaction(conn, &t)?;
    info!(transaction = %t.id, "transaction updated");
    println!(
        "Updated {}: {} {} on {} '{}' [{}]",
        t.id, t.r#type, t.amount, t.date, t.description, t.category
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub account: String,
    pub description: String,
    pub r#type: String,
    pub amount: String,
    pub category: String,
    pub notes: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let accounts = load_accounts(conn)?;
    let transactions = load_transactions(conn)?;

    let account_id = match sub.get_one::<String>("account") {
        Some(name) => Some(account_by_name(conn, name.trim())?.id),
        None => None,
    };
    let filter = TransactionFilter {
        r#type: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TransactionType>())
            .transpose()?,
        account_id,
        search: sub.get_one::<String>("search").cloned(),
        start: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        end: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
    };
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let account_name = |id: &str| {
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    };
    Ok(filter_transactions(&transactions, &accounts, &filter)
        .into_iter()
        .take(limit)
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            account: account_name(&t.account_id),
            description: t.description.clone(),
            r#type: t.r#type.to_string(),
            amount: format!("{:.2}", t.amount),
            category: t.category.clone(),
            notes: t.notes.clone().unwrap_or_default(),
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .into_iter()
            .map(|r| {
                vec![
                    r.date,
                    r.account,
                    r.description,
                    r.r#type,
                    r.amount,
                    r.category,
                    r.notes,
                    r.id,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Account", "Description", "Type", "Amount", "Category", "Notes", "ID"],
                rows,
            )
        );
    }
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Transaction '{}' not found", id);
    }
    println!("Removed transaction {}", id);
    Ok(())
}
