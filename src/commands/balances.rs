// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{Debt, LedgerResult, compute_ledger, pair_balance};
use crate::models::MemberId;
use crate::store;
use crate::utils::{
    display_name, fmt_money, get_currency, id_for_group, id_for_member, maybe_print_json,
    pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("group", sub)) => group(conn, sub)?,
        Some(("pair", sub)) => pair(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtLine {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberLine {
    pub name: String,
    pub net: Decimal,
    pub owes_to: Vec<DebtLine>,
    pub owes_from: Vec<DebtLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub currency: String,
    pub total_expenses: Decimal,
    pub total_settlements: Decimal,
    pub members: Vec<MemberLine>,
    pub debts: Vec<DebtLine>,
}

fn debt_line(names: &HashMap<MemberId, String>, d: &Debt) -> DebtLine {
    DebtLine {
        from: display_name(names, d.from),
        to: display_name(names, d.to),
        amount: d.amount,
    }
}

fn lines(names: &HashMap<MemberId, String>, debts: &[Debt]) -> Vec<DebtLine> {
    debts.iter().map(|d| debt_line(names, d)).collect()
}

/// Recompute a group's ledger from its current expenses and settlements.
pub fn group_report(conn: &Connection, group_id: i64) -> Result<GroupReport> {
    let group = store::load_group(conn, group_id)?;
    let snapshot = store::load_group_snapshot(conn, group_id)?;
    let result: LedgerResult =
        compute_ledger(&snapshot.scope(), &snapshot.expenses, &snapshot.settlements)?;
    let names: HashMap<MemberId, String> = snapshot
        .members
        .iter()
        .map(|m| (m.id, m.name.clone()))
        .collect();

    let members = result
        .positions()
        .into_iter()
        .map(|p| MemberLine {
            name: display_name(&names, p.member_id),
            net: p.net,
            owes_to: lines(&names, &p.owes_to),
            owes_from: lines(&names, &p.owes_from),
        })
        .collect();

    Ok(GroupReport {
        group: group.name,
        currency: get_currency(conn)?,
        total_expenses: result.total_expenses,
        total_settlements: result.total_settlements,
        members,
        debts: lines(&names, &result.debts()),
    })
}

fn group(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let report = group_report(conn, group_id)?;
    let ccy = report.currency.clone();

    if let Some(member) = sub.get_one::<String>("member") {
        let member = member.trim();
        let Some(line) = report.members.iter().find(|l| l.name == member) else {
            bail!("Member '{}' is not part of group '{}'", member, report.group);
        };
        if maybe_print_json(json_flag, jsonl_flag, line)? {
            return Ok(());
        }
        println!("{} net: {}", line.name, fmt_money(&line.net, &ccy));
        let mut rows = Vec::new();
        for d in &line.owes_to {
            rows.push(vec!["owes".to_string(), d.to.clone(), fmt_money(&d.amount, &ccy)]);
        }
        for d in &line.owes_from {
            rows.push(vec!["is owed by".to_string(), d.from.clone(), fmt_money(&d.amount, &ccy)]);
        }
        println!("{}", pretty_table(&["", "Member", "Amount"], rows));
        return Ok(());
    }

    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }
    let debts = report
        .debts
        .iter()
        .map(|d| vec![d.from.clone(), d.to.clone(), fmt_money(&d.amount, &ccy)])
        .collect();
    println!("{}", pretty_table(&["Owes", "To", "Amount"], debts));
    let nets = report
        .members
        .iter()
        .map(|l| vec![l.name.clone(), fmt_money(&l.net, &ccy)])
        .collect();
    println!("{}", pretty_table(&["Member", "Net"], nets));
    println!(
        "Expenses {} | Settlements {}",
        fmt_money(&report.total_expenses, &ccy),
        fmt_money(&report.total_settlements, &ccy)
    );
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryLine {
    pub kind: &'static str,
    pub date: String,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub member: String,
    pub with: String,
    /// Positive: `with` owes `member`.
    pub balance: Decimal,
    pub total_expenses: Decimal,
    pub total_settlements: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryLine>,
}

pub fn pair_report(
    conn: &Connection,
    member_name: &str,
    other_name: &str,
    with_history: bool,
) -> Result<PairReport> {
    let me = id_for_member(conn, member_name)?;
    let other = id_for_member(conn, other_name)?;
    let snapshot = store::load_pair_snapshot(conn, me, other)?;
    let balance = pair_balance(me, other, &snapshot.expenses, &snapshot.settlements)?;

    let mut history = Vec::new();
    if with_history {
        for e in &snapshot.expenses {
            history.push(HistoryLine {
                kind: "expense",
                date: e.date.to_string(),
                description: e.description.clone(),
                amount: e.amount,
            });
        }
        for s in &snapshot.settlements {
            history.push(HistoryLine {
                kind: "settlement",
                date: s.date.to_string(),
                description: s.note.clone(),
                amount: s.amount,
            });
        }
        // Newest first across both kinds.
        history.sort_by(|a, b| b.date.cmp(&a.date));
    }

    Ok(PairReport {
        member: member_name.trim().to_string(),
        with: other_name.trim().to_string(),
        balance: balance.balance,
        total_expenses: balance.total_expenses,
        total_settlements: balance.total_settlements,
        history,
    })
}

fn pair(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = pair_report(
        conn,
        sub.get_one::<String>("member").unwrap(),
        sub.get_one::<String>("with").unwrap(),
        sub.get_flag("history"),
    )?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    if report.balance > Decimal::ZERO {
        println!("{} owes {} {}", report.with, report.member, fmt_money(&report.balance, &ccy));
    } else if report.balance < Decimal::ZERO {
        println!(
            "{} owes {} {}",
            report.member,
            report.with,
            fmt_money(&report.balance.abs(), &ccy)
        );
    } else {
        println!("{} and {} are settled up", report.member, report.with);
    }
    println!(
        "Expenses {} | Settlements {}",
        fmt_money(&report.total_expenses, &ccy),
        fmt_money(&report.total_settlements, &ccy)
    );
    if !report.history.is_empty() {
        let rows = report
            .history
            .iter()
            .map(|h| {
                vec![
                    h.date.clone(),
                    h.kind.to_string(),
                    h.description.clone(),
                    fmt_money(&h.amount, &ccy),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Kind", "Description", "Amount"], rows));
    }
    Ok(())
}
