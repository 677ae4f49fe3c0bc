// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{
    display_name, id_for_group, id_for_member, maybe_print_json, member_names, parse_member_list,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn create(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let admin = id_for_member(conn, sub.get_one::<String>("admin").unwrap())?;
    let members = match sub.get_one::<String>("members") {
        Some(raw) => parse_member_list(conn, raw)?,
        None => Vec::new(),
    };
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    store::create_group(conn, &name, description, admin, &members)?;
    let count = store::group_member_ids(conn, id_for_group(conn, &name)?)?.len();
    println!("Created group '{}' with {} members", name, count);
    Ok(())
}

#[derive(Serialize)]
struct GroupRow {
    name: String,
    admin: String,
    members: usize,
    description: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT g.name, a.name, (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id=g.id),
                COALESCE(g.description,'')
         FROM groups g JOIN members a ON g.admin_id=a.id ORDER BY g.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(GroupRow {
            name: r.get(0)?,
            admin: r.get(1)?,
            members: r.get::<_, i64>(2)? as usize,
            description: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|g| vec![g.name, g.admin, g.members.to_string(), g.description])
            .collect();
        println!(
            "{}",
            pretty_table(&["Group", "Admin", "Members", "Description"], rows)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group_id = id_for_group(conn, sub.get_one::<String>("name").unwrap())?;
    let group = store::load_group(conn, group_id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &group)? {
        return Ok(());
    }
    let names = member_names(conn)?;
    let rows = group
        .members
        .iter()
        .map(|id| {
            let role = if *id == group.admin_id { "admin" } else { "" };
            vec![display_name(&names, *id), role.to_string()]
        })
        .collect();
    println!("{}", group.name);
    if let Some(d) = &group.description {
        println!("{}", d);
    }
    println!("{}", pretty_table(&["Member", "Role"], rows));
    Ok(())
}
