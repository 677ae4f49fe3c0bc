// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::balances::{GroupReport, group_report};
use crate::utils::id_for_group;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => {
            let group = sub.get_one::<String>("group").unwrap();
            let fmt = sub.get_one::<String>("format").unwrap();
            let out = sub.get_one::<String>("out").unwrap();
            export_balances(conn, group, fmt, Path::new(out))?;
            println!("Exported balances for '{}' to {}", group.trim(), out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Write a group's net balances and simplified debts to `out` as csv or json.
pub fn export_balances(conn: &Connection, group: &str, format: &str, out: &Path) -> Result<()> {
    let fmt = format.trim().to_lowercase();
    // Reject before touching the filesystem.
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let report = group_report(conn, id_for_group(conn, group)?)?;
    match fmt.as_str() {
        "csv" => write_csv(&report, out)?,
        _ => write_json(&report, out)?,
    }
    tracing::info!(group = %report.group, path = %out.display(), format = %fmt, "exported balances");
    Ok(())
}

fn write_csv(report: &GroupReport, out: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out)?;
    wtr.write_record(["kind", "member", "counterparty", "amount", "currency"])?;
    for line in &report.members {
        let net = line.net.to_string();
        wtr.write_record([
            "net",
            line.name.as_str(),
            "",
            net.as_str(),
            report.currency.as_str(),
        ])?;
    }
    for d in &report.debts {
        let amount = d.amount.to_string();
        wtr.write_record([
            "debt",
            d.from.as_str(),
            d.to.as_str(),
            amount.as_str(),
            report.currency.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(report: &GroupReport, out: &Path) -> Result<()> {
    let net: Vec<_> = report
        .members
        .iter()
        .map(|l| json!({ "member": l.name, "net": l.net.to_string() }))
        .collect();
    let debts: Vec<_> = report
        .debts
        .iter()
        .map(|d| json!({ "from": d.from, "to": d.to, "amount": d.amount.to_string() }))
        .collect();
    let doc = json!({
        "group": report.group,
        "currency": report.currency,
        "total_expenses": report.total_expenses.to_string(),
        "total_settlements": report.total_settlements.to_string(),
        "net": net,
        "debts": debts,
    });
    std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}
