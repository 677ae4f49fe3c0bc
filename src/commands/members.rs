// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Serialize)]
struct MemberRow {
    name: String,
    email: String,
    created: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let email = sub
                .get_one::<String>("email")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            conn.execute(
                "INSERT INTO members(name, email) VALUES (?1, ?2)",
                params![name, email],
            )
            .with_context(|| format!("Add member '{}'", name))?;
            println!("Added member '{}'", name);
        }
        Some(("list", sub)) => {
            let mut stmt = conn.prepare(
                "SELECT name, COALESCE(email,''), created_at FROM members ORDER BY name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok(MemberRow {
                    name: r.get(0)?,
                    email: r.get(1)?,
                    created: r.get(2)?,
                })
            })?;
            let mut data = Vec::new();
            for row in rows {
                data.push(row?);
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|r| vec![r.name, r.email, r.created])
                    .collect();
                println!("{}", pretty_table(&["Name", "Email", "Created"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            // Foreign keys block removal while anything references the member.
            let n = conn
                .execute("DELETE FROM members WHERE name=?1", params![name])
                .with_context(|| {
                    format!(
                        "Member '{}' is still referenced by groups, expenses or settlements",
                        name
                    )
                })?;
            if n == 0 {
                anyhow::bail!("Member '{}' not found", name);
            }
            println!("Removed member '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
