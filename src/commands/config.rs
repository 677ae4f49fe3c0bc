// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::SplitMode;
use crate::utils::{
    CURRENCY_KEY, SPLIT_MODE_KEY, SPLIT_TOLERANCE_KEY, get_currency, get_split_mode,
    get_split_tolerance, parse_decimal, pretty_table, set_setting,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            println!("{}", pretty_table(&["Key", "Value"], effective_settings(conn)?));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            let stored = set_config(conn, key, value)?;
            println!("{} set to {}", key.trim(), stored);
        }
        _ => {}
    }
    Ok(())
}

/// Every known key with its effective value, defaults filled in.
pub fn effective_settings(conn: &Connection) -> Result<Vec<Vec<String>>> {
    Ok(vec![
        vec![SPLIT_MODE_KEY.into(), get_split_mode(conn)?.as_str().into()],
        vec![SPLIT_TOLERANCE_KEY.into(), get_split_tolerance(conn)?.to_string()],
        vec![CURRENCY_KEY.into(), get_currency(conn)?],
    ])
}

/// Validate and store one setting; returns the normalized value.
pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let stored = match key.trim() {
        SPLIT_MODE_KEY => value.parse::<SplitMode>()?.as_str().to_string(),
        SPLIT_TOLERANCE_KEY => {
            let tol = parse_decimal(value)?;
            if tol < Decimal::ZERO {
                bail!("{} must not be negative", SPLIT_TOLERANCE_KEY);
            }
            tol.normalize().to_string()
        }
        CURRENCY_KEY => {
            let ccy = value.trim().to_uppercase();
            if ccy.is_empty() {
                bail!("{} must not be empty", CURRENCY_KEY);
            }
            ccy
        }
        other => bail!(
            "Unknown setting '{}' (use {}|{}|{})",
            other,
            SPLIT_MODE_KEY,
            SPLIT_TOLERANCE_KEY,
            CURRENCY_KEY
        ),
    };
    set_setting(conn, key.trim(), &stored)?;
    tracing::debug!(key = key.trim(), value = %stored, "setting updated");
    Ok(stored)
}
