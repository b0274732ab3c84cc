// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{account_by_name, insert_imported, load_accounts, load_catalog};
use crate::importer::{ImportOutcome, import_path};
use crate::source::SourceFormat;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub).map(|_| ()),
        _ => Ok(()),
    }
}

/// Runs the importer and stores accepted rows in the target account. Returns
/// the outcome so callers can inspect diagnostics.
pub fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<ImportOutcome> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let format = sub
        .get_one::<String>("format")
        .map(|f| f.parse::<SourceFormat>())
        .transpose()?;
    let dry_run = sub.get_flag("dry_run");

    let account = match sub.get_one::<String>("account") {
        Some(name) => account_by_name(conn, name.trim())?,
        // accounts load oldest first; the newest one is the default target
        None => load_accounts(conn)?
            .into_iter()
            .last()
            .ok_or_else(|| anyhow!("Create at least one account before importing transactions"))?,
    };

    let catalog = load_catalog(conn)?;
    let outcome = import_path(Path::new(path), format, &catalog);
    for d in &outcome.diagnostics {
        println!("{}", d);
    }
    if outcome.skipped() > 0 {
        warn!(skipped = outcome.skipped(), path, "rows skipped during import");
    }

    if dry_run {
        println!(
            "Dry run: {} transactions would be imported into '{}'",
            outcome.transactions.len(),
            account.name
        );
        return Ok(outcome);
    }
    if outcome.transactions.is_empty() {
        return Ok(outcome);
    }

    let stored = insert_imported(conn, &account.id, outcome.transactions.clone())?;
    info!(
        count = stored.len(),
        skipped = outcome.skipped(),
        account = %account.id,
        "import finished"
    );
    println!(
        "Imported {} transactions from {} into '{}'",
        stored.len(),
        path,
        account.name
    );
    Ok(outcome)
}
