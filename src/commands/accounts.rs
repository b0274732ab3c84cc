// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{
    self, account_by_name, get_currency, insert_account, load_accounts, new_id, update_account,
};
use crate::ledger::account_in_use;
use crate::models::{Account, AccountType};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
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

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let typ: AccountType = sub.get_one::<String>("type").unwrap().parse()?;
    let initial_balance = parse_decimal(sub.get_one::<String>("initial_balance").unwrap())?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.trim().to_uppercase(),
        None => get_currency(conn)?,
    };
    let last4 = optional(sub, "last4");
    if let Some(ref l) = last4 {
        check_last4(l)?;
    }
    let account = Account {
        id: new_id("acc"),
        name,
        r#type: typ,
        initial_balance,
        currency,
        created_at: chrono::Utc::now(),
        bank_name: optional(sub, "bank"),
        account_number_last4: last4,
    };
    insert_account(conn, &account)?;
    println!(
        "Added account '{}' ({}, {} {})",
        account.name, account.r#type, account.currency, account.initial_balance
    );
    Ok(())
}

/// Trimmed value of `key`; an empty string counts as absent.
fn optional(sub: &clap::ArgMatches, key: &str) -> Option<String> {
    sub.get_one::<String>(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn check_last4(l: &str) -> Result<()> {
    if l.len() != 4 || !l.chars().all(|c| c.is_ascii_digit()) {
        bail!("Account number suffix '{}' must be exactly 4 digits", l);
    }
    Ok(())
}

/// Changes the given fields of an account found by its current name. For
/// `--bank` and `--last4` an empty value clears the field.
fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let mut account = account_by_name(conn, name)?;

    if let Some(n) = optional(sub, "new_name") {
        account.name = n;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        account.r#type = t.parse()?;
    }
    if let Some(b) = sub.get_one::<String>("initial_balance") {
        account.initial_balance = parse_decimal(b)?;
    }
    if let Some(c) = optional(sub, "currency") {
        account.currency = c.to_uppercase();
    }
    if sub.contains_id("bank") {
        account.bank_name = optional(sub, "bank");
    }
    if sub.contains_id("last4") {
        let last4 = optional(sub, "last4");
        if let Some(ref l) = last4 {
            check_last4(l)?;
        }
        account.account_number_last4 = last4;
    }

    update_account(conn, &account)?;
    info!(account = %account.id, "account updated");
    println!(
        "Updated account '{}' ({}, {} {})",
        account.name, account.r#type, account.currency, account.initial_balance
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = load_accounts(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        let data = accounts
            .into_iter()
            .map(|a| {
                vec![
                    a.name,
                    a.r#type.to_string(),
                    a.currency,
                    format!("{:.2}", a.initial_balance),
                    a.bank_name.unwrap_or_default(),
                    a.account_number_last4.unwrap_or_default(),
                    a.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Type", "Currency", "Initial", "Bank", "Last4", "Created"],
                data
            )
        );
    }
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let account = account_by_name(conn, name)?;
    let transactions = db::load_transactions(conn)?;
    if account_in_use(&account.id, &transactions) {
        bail!(
            "Account '{}' still has transactions; reassign or delete them first",
            name
        );
    }
    conn.execute("DELETE FROM accounts WHERE id=?1", params![account.id])?;
    info!(account = %account.id, "account removed");
    println!("Removed account '{}'", name);
    Ok(())
}
