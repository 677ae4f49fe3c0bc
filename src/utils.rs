// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::engine::{ShareRequest, SplitMode, default_split_tolerance};
use crate::models::MemberId;

pub const SPLIT_MODE_KEY: &str = "split_mode";
pub const SPLIT_TOLERANCE_KEY: &str = "split_tolerance";
pub const CURRENCY_KEY: &str = "currency";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_member(conn: &Connection, name: &str) -> Result<MemberId> {
    let name = name.trim();
    let mut stmt = conn.prepare_cached("SELECT id FROM members WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Member '{}' not found", name))?;
    Ok(MemberId(id))
}

pub fn id_for_group(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    let mut stmt = conn.prepare_cached("SELECT id FROM groups WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Group '{}' not found", name))?;
    Ok(id)
}

pub fn member_names(conn: &Connection) -> Result<HashMap<MemberId, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM members")?;
    let rows = stmt.query_map([], |r| Ok((MemberId(r.get(0)?), r.get::<_, String>(1)?)))?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

pub fn display_name(names: &HashMap<MemberId, String>, id: MemberId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Comma-separated member names, e.g. `alice, bob`.
pub fn parse_member_list(conn: &Connection, raw: &str) -> Result<Vec<MemberId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| id_for_member(conn, name))
        .collect()
}

/// `name=value`, e.g. `alice=40`.
pub fn parse_share(conn: &Connection, raw: &str) -> Result<ShareRequest> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid share '{}', expected NAME=VALUE", raw.trim()))?;
    let member = id_for_member(conn, name)?;
    let value = parse_decimal(value).with_context(|| format!("Invalid share '{}'", raw.trim()))?;
    Ok(ShareRequest::with_value(member, value))
}

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

pub fn get_split_mode(conn: &Connection) -> Result<SplitMode> {
    match get_setting(conn, SPLIT_MODE_KEY)? {
        Some(v) => Ok(v.parse::<SplitMode>()?),
        None => Ok(SplitMode::default()),
    }
}

pub fn get_split_tolerance(conn: &Connection) -> Result<Decimal> {
    match get_setting(conn, SPLIT_TOLERANCE_KEY)? {
        Some(v) => parse_decimal(&v)
            .with_context(|| format!("Invalid {} setting '{}'", SPLIT_TOLERANCE_KEY, v)),
        None => Ok(default_split_tolerance()),
    }
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_KEY)?.unwrap_or_else(|| "USD".to_string()))
}
