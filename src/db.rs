// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::catalog::{Catalog, default_categories};
use crate::models::{Account, Category, Transaction, TransactionDraft};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tallybook", "tallybook"));

/// Overrides the platform data dir location of the ledger file.
pub const DB_ENV: &str = "TALLYBOOK_DB";

pub const DEFAULT_CURRENCY: &str = "BRL";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tallybook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    debug!(path = %path.display(), "opening ledger");
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates missing tables and seeds the default category catalog.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        type TEXT NOT NULL,
        initial_balance TEXT NOT NULL DEFAULT '0',
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL,
        bank_name TEXT,
        account_number_last4 TEXT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer')),
        position INTEGER NOT NULL,
        UNIQUE(name, type)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer')),
        category TEXT NOT NULL,
        account_id TEXT NOT NULL,
        notes TEXT,
        imported INTEGER NOT NULL DEFAULT 0,
        is_recurring_instance INTEGER NOT NULL DEFAULT 0,
        peer_transaction_id TEXT,
        FOREIGN KEY(account_id) REFERENCES accounts(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    "#,
    )?;
    for (pos, c) in default_categories().iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO categories(id, name, type, position) VALUES (?1,?2,?3,?4)",
            params![c.id, c.name, c.r#type.as_str(), pos as i64],
        )?;
    }
    Ok(())
}

// Settings

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

// Snapshots

fn decimal_col(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parsed_col<T>(r: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn account_from_row(r: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: parsed_col(r, 2)?,
        initial_balance: decimal_col(r, 3)?,
        currency: r.get(4)?,
        created_at: parsed_col::<DateTime<Utc>>(r, 5)?,
        bank_name: r.get(6)?,
        account_number_last4: r.get(7)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, name, type, initial_balance, currency, created_at, bank_name, account_number_last4";

/// Accounts in creation order.
pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM accounts ORDER BY created_at, rowid",
        ACCOUNT_COLUMNS
    ))?;
    let rows = stmt.query_map([], account_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn account_by_name(conn: &Connection, name: &str) -> Result<Account> {
    conn.query_row(
        &format!("SELECT {} FROM accounts WHERE name=?1", ACCOUNT_COLUMNS),
        params![name],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| anyhow!("Account '{}' not found", name))
}

pub fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, type FROM categories ORDER BY position, rowid")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            r#type: parsed_col(r, 2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    Ok(Catalog::new(load_categories(conn)?))
}

fn transaction_from_row(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        date: parsed_col::<NaiveDate>(r, 1)?,
        description: r.get(2)?,
        amount: decimal_col(r, 3)?,
        r#type: parsed_col(r, 4)?,
        category: r.get(5)?,
        account_id: r.get(6)?,
        notes: r.get(7)?,
        imported: r.get(8)?,
        is_recurring_instance: r.get(9)?,
        peer_transaction_id: r.get(10)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, date, description, amount, type, category, account_id, notes, imported, is_recurring_instance, peer_transaction_id";

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM transactions ORDER BY date, rowid",
        TRANSACTION_COLUMNS
    ))?;
    let rows = stmt.query_map([], transaction_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn transaction_by_id(conn: &Connection, id: &str) -> Result<Transaction> {
    conn.query_row(
        &format!("SELECT {} FROM transactions WHERE id=?1", TRANSACTION_COLUMNS),
        params![id],
        transaction_from_row,
    )
    .optional()?
    .ok_or_else(|| anyhow!("Transaction '{}' not found", id))
}

// Writes

pub fn insert_account(conn: &Connection, a: &Account) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO accounts({}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            ACCOUNT_COLUMNS
        ),
        params![
            a.id,
            a.name,
            a.r#type.as_str(),
            a.initial_balance.to_string(),
            a.currency,
            a.created_at.to_rfc3339(),
            a.bank_name,
            a.account_number_last4
        ],
    )
    .with_context(|| format!("Insert account '{}'", a.name))?;
    Ok(())
}

pub fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, date, description, amount, type, category, account_id,
                                  notes, imported, is_recurring_instance, peer_transaction_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
        params![
            t.id,
            t.date.to_string(),
            t.description,
            t.amount.to_string(),
            t.r#type.as_str(),
            t.category,
            t.account_id,
            t.notes,
            t.imported,
            t.is_recurring_instance,
            t.peer_transaction_id
        ],
    )?;
    Ok(())
}

/// Replaces every column of the account stored under `a.id`.
pub fn update_account(conn: &Connection, a: &Account) -> Result<()> {
    let n = conn
        .execute(
            "UPDATE accounts SET name=?2, type=?3, initial_balance=?4, currency=?5,
                                 bank_name=?6, account_number_last4=?7
             WHERE id=?1",
            params![
                a.id,
                a.name,
                a.r#type.as_str(),
                a.initial_balance.to_string(),
                a.currency,
                a.bank_name,
                a.account_number_last4
            ],
        )
        .with_context(|| format!("Update account '{}'", a.name))?;
    if n == 0 {
        bail!("Account '{}' not found", a.id);
    }
    Ok(())
}

/// Replaces the transaction stored under `t.id`.
pub fn update_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    let n = conn.execute(
        "UPDATE transactions SET date=?2, description=?3, amount=?4, type=?5, category=?6,
                                 account_id=?7, notes=?8, imported=?9,
                                 is_recurring_instance=?10, peer_transaction_id=?11
         WHERE id=?1",
        params![
            t.id,
            t.date.to_string(),
            t.description,
            t.amount.to_string(),
            t.r#type.as_str(),
            t.category,
            t.account_id,
            t.notes,
            t.imported,
            t.is_recurring_instance,
            t.peer_transaction_id
        ],
    )?;
    if n == 0 {
        bail!("Transaction '{}' not found", t.id);
    }
    Ok(())
}

pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Assigns ids and the target account to imported drafts and stores them in
/// one SQL transaction.
pub fn insert_imported(
    conn: &mut Connection,
    account_id: &str,
    drafts: Vec<TransactionDraft>,
) -> Result<Vec<Transaction>> {
    let tx = conn.transaction()?;
    let mut stored = Vec::with_capacity(drafts.len());
    for d in drafts {
        let t = d.into_transaction(new_id("txn_imported"), account_id);
        insert_transaction(&tx, &t)?;
        stored.push(t);
    }
    tx.commit()?;
    Ok(stored)
}
