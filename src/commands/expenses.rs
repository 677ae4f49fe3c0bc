// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{ShareRequest, SplitDraft, split_expense};
use crate::models::{Expense, MemberId, SplitType};
use crate::store;
use crate::utils::{
    display_name, fmt_money, get_currency, get_split_mode, get_split_tolerance, id_for_group,
    id_for_member, maybe_print_json, member_names, parse_date, parse_decimal, parse_member_list,
    parse_share, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("preview", sub)) => preview(conn, sub)?,
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let raw = sub.get_one::<String>("id").unwrap();
            let id = raw.trim().parse::<i64>()?;
            store::delete_expense(conn, id)?;
            println!("Removed expense {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// What the user typed for a draft expense, resolved to ids.
#[derive(Debug, Clone)]
pub struct ExpenseRequest {
    pub amount: Decimal,
    pub split_type: SplitType,
    pub payer: MemberId,
    pub participants: Vec<ShareRequest>,
    pub group_id: Option<i64>,
}

pub fn read_request(conn: &Connection, sub: &clap::ArgMatches) -> Result<ExpenseRequest> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let split_type = sub.get_one::<String>("split").unwrap().parse::<SplitType>()?;
    let payer = id_for_member(conn, sub.get_one::<String>("payer").unwrap())?;
    let group_id = match sub.get_one::<String>("group") {
        Some(g) => Some(id_for_group(conn, g)?),
        None => None,
    };
    let shares: Vec<&String> = sub
        .get_many::<String>("share")
        .map(|v| v.collect())
        .unwrap_or_default();
    let with = sub.get_one::<String>("with");

    let participants = match split_type {
        SplitType::Equal => {
            if !shares.is_empty() {
                bail!("--share is for percentage or amount splits; use --with for an equal split");
            }
            let ids = match (with, group_id) {
                (Some(raw), _) => parse_member_list(conn, raw)?,
                // Selecting a group pre-fills every member
                (None, Some(gid)) => store::group_member_ids(conn, gid)?,
                (None, None) => bail!("An equal split needs --with or --group"),
            };
            ids.into_iter().map(ShareRequest::member).collect()
        }
        SplitType::Percentage | SplitType::Amount => {
            if with.is_some() {
                bail!(
                    "Use --share NAME=VALUE for {} splits",
                    split_type.as_str().to_lowercase()
                );
            }
            shares
                .iter()
                .map(|raw| parse_share(conn, raw))
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(ExpenseRequest {
        amount,
        split_type,
        payer,
        participants,
        group_id,
    })
}

/// Run the split calculator with the configured split mode.
pub fn draft_splits(conn: &Connection, req: &ExpenseRequest) -> Result<SplitDraft> {
    let mode = get_split_mode(conn)?;
    Ok(split_expense(
        req.amount,
        req.split_type,
        req.payer,
        &req.participants,
        mode,
    )?)
}

fn print_draft(conn: &Connection, draft: &SplitDraft) -> Result<()> {
    let names = member_names(conn)?;
    let ccy = get_currency(conn)?;
    let rows = draft
        .splits
        .iter()
        .map(|s| {
            vec![
                display_name(&names, s.member_id),
                fmt_money(&s.owed_amount, &ccy),
                format!("{:.1}%", s.owed_percentage),
                if s.has_already_paid { "paid" } else { "" }.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Member", "Owes", "Share", ""], rows));
    println!(
        "Total {} of {}",
        fmt_money(&draft.total(), &ccy),
        fmt_money(&draft.amount, &ccy)
    );
    Ok(())
}

fn preview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let req = read_request(conn, sub)?;
    let draft = draft_splits(conn, &req)?;
    print_draft(conn, &draft)?;
    match draft.discrepancy(get_split_tolerance(conn)?) {
        Some(d) => println!("{}", d),
        None => println!("Splits add up to the total"),
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let req = read_request(conn, sub)?;
    let draft = draft_splits(conn, &req)?;
    if let Some(d) = draft.discrepancy(get_split_tolerance(conn)?) {
        if !sub.get_flag("allow_mismatch") {
            bail!(
                "{} (splits total {}, expense amount {}); pass --allow-mismatch to save anyway",
                d,
                draft.total(),
                draft.amount
            );
        }
        tracing::warn!(discrepancy = %d, "saving expense with mismatched splits");
    }
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let description = sub.get_one::<String>("description").unwrap().trim().to_string();
    let expense = Expense {
        id: 0,
        amount: req.amount,
        payer_id: req.payer,
        split_type: req.split_type,
        group_id: req.group_id,
        date,
        description,
        splits: draft.into_splits(),
    };
    let id = store::insert_expense(conn, &expense)?;
    println!(
        "Recorded expense {} '{}' for {} on {}",
        id,
        expense.description,
        fmt_money(&expense.amount, &get_currency(conn)?),
        expense.date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub payer: String,
    pub amount: String,
    pub split_type: String,
    pub group: String,
    pub participants: i64,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let mut sql = String::from(
        "SELECT e.id, e.date, e.description, p.name, e.amount, e.split_type, g.name,
                (SELECT COUNT(*) FROM splits s WHERE s.expense_id=e.id)
         FROM expenses e
         JOIN members p ON e.payer_id=p.id
         LEFT JOIN groups g ON e.group_id=g.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(group) = sub.get_one::<String>("group") {
        sql.push_str(" AND g.name=?");
        params_vec.push(group.trim().into());
    }
    if let Some(member) = sub.get_one::<String>("member") {
        sql.push_str(
            " AND (p.name=? OR EXISTS (SELECT 1 FROM splits s JOIN members m ON s.member_id=m.id
                  WHERE s.expense_id=e.id AND m.name=?))",
        );
        params_vec.push(member.trim().into());
        params_vec.push(member.trim().into());
    }
    sql.push_str(" ORDER BY e.date DESC, e.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(ExpenseRow {
            id: r.get(0)?,
            date: r.get(1)?,
            description: r.get(2)?,
            payer: r.get(3)?,
            amount: r.get(4)?,
            split_type: r.get(5)?,
            group: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            participants: r.get(7)?,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date,
                    r.description,
                    r.payer,
                    r.amount,
                    r.split_type,
                    r.group,
                    r.participants.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Paid by", "Amount", "Split", "Group", "People"],
                rows,
            )
        );
    }
    Ok(())
}
