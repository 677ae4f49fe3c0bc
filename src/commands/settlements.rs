// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Settlement;
use crate::store;
use crate::utils::{
    fmt_money, get_currency, id_for_group, id_for_member, maybe_print_json, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let raw = sub.get_one::<String>("id").unwrap();
            let id = raw.trim().parse::<i64>()?;
            store::delete_settlement(conn, id)?;
            println!("Removed settlement {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from_name = sub.get_one::<String>("from").unwrap().trim();
    let to_name = sub.get_one::<String>("to").unwrap().trim();
    let sender_id = id_for_member(conn, from_name)?;
    let receiver_id = id_for_member(conn, to_name)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let group_id = match sub.get_one::<String>("group") {
        Some(g) => Some(id_for_group(conn, g)?),
        None => None,
    };
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let settlement = Settlement {
        id: 0,
        sender_id,
        receiver_id,
        amount,
        group_id,
        date,
        note,
    };
    let id = store::insert_settlement(conn, &settlement)?;
    println!(
        "Recorded settlement {}: {} paid {} {}",
        id,
        from_name,
        to_name,
        fmt_money(&amount, &get_currency(conn)?)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct SettlementRow {
    pub id: i64,
    pub date: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub group: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<SettlementRow>> {
    let mut sql = String::from(
        "SELECT s.id, s.date, f.name, t.name, s.amount, g.name, s.note
         FROM settlements s
         JOIN members f ON s.sender_id=f.id
         JOIN members t ON s.receiver_id=t.id
         LEFT JOIN groups g ON s.group_id=g.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(group) = sub.get_one::<String>("group") {
        sql.push_str(" AND g.name=?");
        params_vec.push(group.trim().into());
    }
    if let Some(member) = sub.get_one::<String>("member") {
        sql.push_str(" AND (f.name=? OR t.name=?)");
        params_vec.push(member.trim().into());
        params_vec.push(member.trim().into());
    }
    sql.push_str(" ORDER BY s.date DESC, s.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(SettlementRow {
            id: r.get(0)?,
            date: r.get(1)?,
            from: r.get(2)?,
            to: r.get(3)?,
            amount: r.get(4)?,
            group: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
            note: r.get(6)?,
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
                    r.from,
                    r.to,
                    r.amount,
                    r.group,
                    r.note,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "From", "To", "Amount", "Group", "Note"], rows)
        );
    }
    Ok(())
}
