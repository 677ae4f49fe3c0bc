// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read snapshots for the engine and write records.
//!
//! An expense header and its splits are written in one transaction, so a
//! snapshot never sees an expense without its splits.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, ToSql, params};
use rust_decimal::Decimal;

use crate::engine::{LedgerError, Scope, check_amount_limit};
use crate::models::{Expense, Group, Member, MemberId, Settlement, Split, SplitType};

/// Everything one ledger computation reads.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl Snapshot {
    pub fn scope(&self) -> Scope {
        Scope::new(self.members.iter().map(|m| m.id))
    }
}

fn parse_amount(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in {}", raw, what))
}

fn parse_stored_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}'", raw))
}

pub fn load_members(conn: &Connection, ids: &[MemberId]) -> Result<Vec<Member>> {
    let mut stmt = conn.prepare_cached("SELECT id, name, email FROM members WHERE id=?1")?;
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let m = stmt
            .query_row(params![id.0], |r| {
                Ok(Member {
                    id: MemberId(r.get(0)?),
                    name: r.get(1)?,
                    email: r.get(2)?,
                })
            })
            .with_context(|| format!("Member {} not found", id))?;
        out.push(m);
    }
    Ok(out)
}

pub fn group_member_ids(conn: &Connection, group_id: i64) -> Result<Vec<MemberId>> {
    let mut stmt = conn.prepare_cached(
        "SELECT member_id FROM group_members WHERE group_id=?1 ORDER BY member_id",
    )?;
    let rows = stmt.query_map(params![group_id], |r| r.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(MemberId(row?));
    }
    Ok(out)
}

pub fn load_group(conn: &Connection, group_id: i64) -> Result<Group> {
    let (name, description, admin_id): (String, Option<String>, i64) = conn
        .query_row(
            "SELECT name, description, admin_id FROM groups WHERE id=?1",
            params![group_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .with_context(|| format!("Group {} not found", group_id))?;
    Ok(Group {
        id: group_id,
        name,
        description,
        admin_id: MemberId(admin_id),
        members: group_member_ids(conn, group_id)?,
    })
}

/// Create a group. The admin is always a member.
pub fn create_group(
    conn: &mut Connection,
    name: &str,
    description: Option<&str>,
    admin: MemberId,
    members: &[MemberId],
) -> Result<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO groups(name, description, admin_id) VALUES (?1, ?2, ?3)",
        params![name, description, admin.0],
    )
    .with_context(|| format!("Create group '{}'", name))?;
    let group_id = tx.last_insert_rowid();
    for m in std::iter::once(&admin).chain(members) {
        tx.execute(
            "INSERT OR IGNORE INTO group_members(group_id, member_id) VALUES (?1, ?2)",
            params![group_id, m.0],
        )?;
    }
    tx.commit()?;
    tracing::debug!(group_id, name, "group created");
    Ok(group_id)
}

fn load_splits(conn: &Connection, expense_id: i64) -> Result<Vec<Split>> {
    let mut stmt = conn.prepare_cached(
        "SELECT member_id, owed_amount, owed_percentage, has_already_paid
         FROM splits WHERE expense_id=?1 ORDER BY id",
    )?;
    let mut rows = stmt.query(params![expense_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let member_id: i64 = r.get(0)?;
        let owed_s: String = r.get(1)?;
        let pct_s: String = r.get(2)?;
        let paid: bool = r.get(3)?;
        let what = format!("splits of expense {}", expense_id);
        out.push(Split {
            member_id: MemberId(member_id),
            owed_amount: parse_amount(&owed_s, &what)?,
            owed_percentage: parse_amount(&pct_s, &what)?,
            has_already_paid: paid,
        });
    }
    Ok(out)
}

fn query_expenses(conn: &Connection, filter: &str, args: &[&dyn ToSql]) -> Result<Vec<Expense>> {
    let sql = format!(
        "SELECT e.id, e.amount, e.payer_id, e.split_type, e.group_id, e.date, e.description
         FROM expenses e WHERE {} ORDER BY e.date DESC, e.id DESC",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(args)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let payer_id: i64 = r.get(2)?;
        let split_type_s: String = r.get(3)?;
        let group_id: Option<i64> = r.get(4)?;
        let date_s: String = r.get(5)?;
        let description: String = r.get(6)?;
        out.push(Expense {
            id,
            amount: parse_amount(&amount_s, &format!("expense {}", id))?,
            payer_id: MemberId(payer_id),
            split_type: split_type_s.parse::<SplitType>()?,
            group_id,
            date: parse_stored_date(&date_s)?,
            description,
            splits: load_splits(conn, id)?,
        });
    }
    Ok(out)
}

fn query_settlements(
    conn: &Connection,
    filter: &str,
    args: &[&dyn ToSql],
) -> Result<Vec<Settlement>> {
    let sql = format!(
        "SELECT id, sender_id, receiver_id, amount, group_id, date, note
         FROM settlements WHERE {} ORDER BY date DESC, id DESC",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(args)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let amount_s: String = r.get(3)?;
        let date_s: String = r.get(5)?;
        out.push(Settlement {
            id,
            sender_id: MemberId(r.get(1)?),
            receiver_id: MemberId(r.get(2)?),
            amount: parse_amount(&amount_s, &format!("settlement {}", id))?,
            group_id: r.get(4)?,
            date: parse_stored_date(&date_s)?,
            note: r.get(6)?,
        });
    }
    Ok(out)
}

pub fn all_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    query_expenses(conn, "1=1", &[])
}

pub fn all_settlements(conn: &Connection) -> Result<Vec<Settlement>> {
    query_settlements(conn, "1=1", &[])
}

pub fn load_group_snapshot(conn: &Connection, group_id: i64) -> Result<Snapshot> {
    let member_ids = group_member_ids(conn, group_id)?;
    let snapshot = Snapshot {
        members: load_members(conn, &member_ids)?,
        expenses: query_expenses(conn, "e.group_id=?1", &[&group_id])?,
        settlements: query_settlements(conn, "group_id=?1", &[&group_id])?,
    };
    tracing::debug!(
        group_id,
        expenses = snapshot.expenses.len(),
        settlements = snapshot.settlements.len(),
        "loaded group snapshot"
    );
    Ok(snapshot)
}

/// Non-group records between `a` and `b`: expenses paid by one of them
/// where both hold a split, and settlements in either direction.
///
/// Settlements made inside a group are left out too, even though they are
/// between the same two members: the group expenses they pay off are not in
/// this snapshot, so counting them would skew the one-on-one balance.
pub fn load_pair_snapshot(conn: &Connection, a: MemberId, b: MemberId) -> Result<Snapshot> {
    let expenses = query_expenses(
        conn,
        "e.group_id IS NULL AND e.payer_id IN (?1, ?2)
         AND EXISTS (SELECT 1 FROM splits s WHERE s.expense_id=e.id AND s.member_id=?1)
         AND EXISTS (SELECT 1 FROM splits s WHERE s.expense_id=e.id AND s.member_id=?2)",
        &[&a.0, &b.0],
    )?;
    let settlements = query_settlements(
        conn,
        "group_id IS NULL AND ((sender_id=?1 AND receiver_id=?2) OR (sender_id=?2 AND receiver_id=?1))",
        &[&a.0, &b.0],
    )?;
    Ok(Snapshot {
        members: load_members(conn, &[a, b])?,
        expenses,
        settlements,
    })
}

fn require_group_members(conn: &Connection, group_id: i64, ids: &[MemberId]) -> Result<()> {
    let group = load_group(conn, group_id)?;
    for id in ids {
        if !group.members.contains(id) {
            bail!("Member {} is not part of group '{}'", id, group.name);
        }
    }
    Ok(())
}

/// Insert an expense and its splits. `has_already_paid` is rewritten to mark
/// exactly the payer's own split.
pub fn insert_expense(conn: &mut Connection, expense: &Expense) -> Result<i64> {
    if expense.amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "expense amount must be positive, got {}",
            expense.amount
        ))
        .into());
    }
    check_amount_limit(expense.amount, "expense amount")?;
    if expense.splits.is_empty() {
        return Err(LedgerError::NoParticipants.into());
    }
    for s in &expense.splits {
        if s.owed_amount < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "share for member {} cannot be negative, got {}",
                s.member_id, s.owed_amount
            ))
            .into());
        }
        check_amount_limit(s.owed_amount, "share")?;
    }
    if let Some(group_id) = expense.group_id {
        let mut ids: Vec<MemberId> = expense.splits.iter().map(|s| s.member_id).collect();
        ids.push(expense.payer_id);
        require_group_members(conn, group_id, &ids)?;
    }

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO expenses(amount, payer_id, split_type, group_id, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            expense.amount.to_string(),
            expense.payer_id.0,
            expense.split_type.as_str(),
            expense.group_id,
            expense.date.to_string(),
            expense.description,
        ],
    )?;
    let expense_id = tx.last_insert_rowid();
    for s in &expense.splits {
        tx.execute(
            "INSERT INTO splits(expense_id, member_id, owed_amount, owed_percentage, has_already_paid)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense_id,
                s.member_id.0,
                s.owed_amount.to_string(),
                s.owed_percentage.to_string(),
                s.member_id == expense.payer_id,
            ],
        )
        .with_context(|| format!("Insert split for member {}", s.member_id))?;
    }
    tx.commit()?;
    tracing::debug!(expense_id, splits = expense.splits.len(), "expense stored");
    Ok(expense_id)
}

pub fn insert_settlement(conn: &Connection, settlement: &Settlement) -> Result<i64> {
    if settlement.amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "settlement amount must be positive, got {}",
            settlement.amount
        ))
        .into());
    }
    check_amount_limit(settlement.amount, "settlement amount")?;
    if settlement.sender_id == settlement.receiver_id {
        return Err(LedgerError::SelfPair(settlement.sender_id).into());
    }
    if let Some(group_id) = settlement.group_id {
        require_group_members(
            conn,
            group_id,
            &[settlement.sender_id, settlement.receiver_id],
        )?;
    }
    conn.execute(
        "INSERT INTO settlements(sender_id, receiver_id, amount, group_id, date, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            settlement.sender_id.0,
            settlement.receiver_id.0,
            settlement.amount.to_string(),
            settlement.group_id,
            settlement.date.to_string(),
            settlement.note,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(settlement_id = id, "settlement stored");
    Ok(id)
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM expenses WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Expense {} not found", id));
    }
    Ok(())
}

pub fn delete_settlement(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM settlements WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Settlement {} not found", id));
    }
    Ok(())
}
