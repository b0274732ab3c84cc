// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{DEFAULT_CURRENCY, get_setting, set_setting};
use anyhow::{Result, bail};
use rusqlite::Connection;

const KNOWN_KEYS: &[&str] = &["currency"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = checked_key(sub.get_one::<String>("key").unwrap())?;
            let value = get_setting(conn, &key)?.unwrap_or_else(|| default_for(&key));
            println!("{} = {}", key, value);
        }
        Some(("set", sub)) => {
            let key = checked_key(sub.get_one::<String>("key").unwrap())?;
            let raw = sub.get_one::<String>("value").unwrap().trim();
            let value = match key.as_str() {
                "currency" => {
                    if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
                        bail!("Currency '{}' must be a 3-letter code", raw);
                    }
                    raw.to_uppercase()
                }
                _ => raw.to_string(),
            };
            set_setting(conn, &key, &value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}

fn checked_key(k: &str) -> Result<String> {
    let k = k.trim().to_lowercase();
    if !KNOWN_KEYS.contains(&k.as_str()) {
        bail!("Unknown setting '{}' (known: {})", k, KNOWN_KEYS.join(", "));
    }
    Ok(k)
}

fn default_for(key: &str) -> String {
    match key {
        "currency" => DEFAULT_CURRENCY.to_string(),
        _ => String::new(),
    }
}
