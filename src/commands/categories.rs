// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_categories, new_id};
use crate::models::TransactionType;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let typ: TransactionType = sub.get_one::<String>("type").unwrap().parse()?;
            conn.execute(
                "INSERT INTO categories(id, name, type, position)
                 VALUES (?1, ?2, ?3, (SELECT IFNULL(MAX(position), -1) + 1 FROM categories))",
                params![new_id("cat"), name, typ.as_str()],
            )
            .with_context(|| format!("Category '{}' already exists for {}", name, typ))?;
            println!("Added category '{}' ({})", name, typ);
        }
        Some(("list", sub)) => {
            let wanted = sub
                .get_one::<String>("type")
                .map(|s| s.parse::<TransactionType>())
                .transpose()?;
            let cats: Vec<_> = load_categories(conn)?
                .into_iter()
                .filter(|c| wanted.is_none_or(|t| c.r#type == t))
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let data = cats
                    .into_iter()
                    .map(|c| vec![c.name, c.r#type.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Type"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
