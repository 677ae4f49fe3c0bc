// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{SplitDraft, check_amount_limit, compute_ledger};
use crate::store;
use crate::utils::{get_split_tolerance, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = collect_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// One `[issue, detail]` row per problem found in stored data.
pub fn collect_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let tolerance = get_split_tolerance(conn)?;

    // 1) Expenses whose splits don't add up, and paid flags on the wrong split
    for e in store::all_expenses(conn)? {
        let out_of_range = std::iter::once(e.amount)
            .chain(e.splits.iter().map(|s| s.owed_amount))
            .find_map(|a| check_amount_limit(a, &format!("expense {}", e.id)).err());
        if let Some(err) = out_of_range {
            rows.push(vec!["amount_out_of_range".into(), err.to_string()]);
            continue;
        }
        let draft = SplitDraft {
            amount: e.amount,
            splits: e.splits.clone(),
        };
        if let Some(d) = draft.discrepancy(tolerance) {
            rows.push(vec!["split_mismatch".into(), format!("expense {}: {}", e.id, d)]);
        }
        for s in &e.splits {
            if s.has_already_paid != (s.member_id == e.payer_id) {
                rows.push(vec![
                    "paid_flag".into(),
                    format!("expense {} member {}", e.id, s.member_id),
                ]);
            }
        }
    }

    // 2) Settlements out of range or made to oneself
    for s in store::all_settlements(conn)? {
        if let Err(err) = check_amount_limit(s.amount, &format!("settlement {}", s.id)) {
            rows.push(vec!["amount_out_of_range".into(), err.to_string()]);
        }
        if s.sender_id == s.receiver_id {
            rows.push(vec![
                "self_settlement".into(),
                format!("settlement {} member {}", s.id, s.sender_id),
            ]);
        }
    }

    // 3) Groups whose ledger can't be computed or doesn't net to zero
    let mut stmt = conn.prepare("SELECT id, name FROM groups ORDER BY name")?;
    let groups = stmt
        .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (id, name) in groups {
        let snapshot = store::load_group_snapshot(conn, id)?;
        match compute_ledger(&snapshot.scope(), &snapshot.expenses, &snapshot.settlements) {
            Ok(result) => {
                let total = result.net.total();
                if total != Decimal::ZERO {
                    rows.push(vec![
                        "group_not_conserving".into(),
                        format!("{}: net total {}", name, total),
                    ]);
                }
            }
            Err(err) => rows.push(vec!["group_ledger".into(), format!("{}: {}", name, err)]),
        }
    }

    tracing::debug!(issues = rows.len(), "doctor finished");
    Ok(rows)
}
