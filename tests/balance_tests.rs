// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use splitclip::commands::balances::{self, group_report, pair_report};
use splitclip::models::{Expense, MemberId, Settlement, Split, SplitType};
use splitclip::{cli, db, store, utils};

const ALICE: MemberId = MemberId(1);
const BOB: MemberId = MemberId(2);
const CAROL: MemberId = MemberId(3);

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, n).unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    for name in ["alice", "bob", "carol"] {
        conn.execute("INSERT INTO members(name) VALUES (?1)", [name])
            .unwrap();
    }
    store::create_group(&mut conn, "trip", None, ALICE, &[BOB, CAROL]).unwrap();
    conn
}

fn expense(
    group_id: Option<i64>,
    date: NaiveDate,
    amount: &str,
    payer: MemberId,
    shares: &[(MemberId, &str)],
) -> Expense {
    Expense {
        id: 0,
        amount: d(amount),
        payer_id: payer,
        split_type: SplitType::Amount,
        group_id,
        date,
        description: "shared".into(),
        splits: shares
            .iter()
            .map(|(m, owed)| Split {
                member_id: *m,
                owed_amount: d(owed),
                owed_percentage: Decimal::ZERO,
                has_already_paid: false,
            })
            .collect(),
    }
}

fn settle(group_id: Option<i64>, date: NaiveDate, from: MemberId, to: MemberId, amount: &str) -> Settlement {
    Settlement {
        id: 0,
        sender_id: from,
        receiver_id: to,
        amount: d(amount),
        group_id,
        date,
        note: "cash".into(),
    }
}

#[test]
fn group_report_after_dinner_and_settlement() {
    let mut conn = setup();
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    store::insert_expense(
        &mut conn,
        &expense(Some(gid), day(1), "90", ALICE, &[(ALICE, "30"), (BOB, "30"), (CAROL, "30")]),
    )
    .unwrap();
    store::insert_settlement(&conn, &settle(Some(gid), day(2), BOB, ALICE, "30")).unwrap();

    let report = group_report(&conn, gid).unwrap();
    assert_eq!(report.group, "trip");
    assert_eq!(report.currency, "USD");
    assert_eq!(report.total_expenses, d("90"));
    assert_eq!(report.total_settlements, d("30"));
    assert_eq!(report.debts.len(), 1);
    assert_eq!(report.debts[0].from, "carol");
    assert_eq!(report.debts[0].to, "alice");
    assert_eq!(report.debts[0].amount, d("30"));

    let nets: Vec<(String, Decimal)> = report
        .members
        .iter()
        .map(|m| (m.name.clone(), m.net))
        .collect();
    assert_eq!(
        nets,
        vec![
            ("alice".to_string(), d("30")),
            ("bob".to_string(), d("0")),
            ("carol".to_string(), d("-30")),
        ]
    );
}

#[test]
fn empty_group_reports_nothing_owed() {
    let conn = setup();
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    let report = group_report(&conn, gid).unwrap();
    assert!(report.debts.is_empty());
    assert!(report.members.iter().all(|m| m.net.is_zero()));
}

#[test]
fn pair_report_nets_both_directions() {
    let mut conn = setup();
    store::insert_expense(&mut conn, &expense(None, day(1), "80", ALICE, &[(ALICE, "40"), (BOB, "40")]))
        .unwrap();
    store::insert_expense(&mut conn, &expense(None, day(2), "30", BOB, &[(ALICE, "15"), (BOB, "15")]))
        .unwrap();
    // Group records stay out of the one-on-one view.
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    store::insert_expense(&mut conn, &expense(Some(gid), day(3), "50", ALICE, &[(BOB, "50")]))
        .unwrap();

    let mine = pair_report(&conn, "alice", "bob", false).unwrap();
    assert_eq!(mine.balance, d("25"));
    assert_eq!(mine.total_expenses, d("110"));
    assert!(mine.history.is_empty());

    let theirs = pair_report(&conn, "bob", "alice", false).unwrap();
    assert_eq!(theirs.balance, d("-25"));
}

#[test]
fn pair_history_is_newest_first() {
    let mut conn = setup();
    store::insert_expense(&mut conn, &expense(None, day(1), "60", ALICE, &[(ALICE, "30"), (BOB, "30")]))
        .unwrap();
    store::insert_settlement(&conn, &settle(None, day(4), BOB, ALICE, "30")).unwrap();

    let report = pair_report(&conn, "alice", "bob", true).unwrap();
    assert_eq!(report.balance, Decimal::ZERO);
    let kinds: Vec<&str> = report.history.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec!["settlement", "expense"]);
}

#[test]
fn balance_commands_run_from_cli() {
    let mut conn = setup();
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    store::insert_expense(
        &mut conn,
        &expense(Some(gid), day(1), "90", ALICE, &[(ALICE, "30"), (BOB, "30"), (CAROL, "30")]),
    )
    .unwrap();

    for argv in [
        vec!["splitclip", "balance", "group", "--group", "trip"],
        vec!["splitclip", "balance", "group", "--group", "trip", "--member", "bob", "--json"],
        vec!["splitclip", "balance", "pair", "--member", "alice", "--with", "carol", "--history"],
    ] {
        let matches = cli::build_cli().get_matches_from(argv);
        if let Some(("balance", m)) = matches.subcommand() {
            balances::handle(&conn, m).unwrap();
        } else {
            panic!("no balance subcommand");
        }
    }

    let matches = cli::build_cli().get_matches_from([
        "splitclip", "balance", "group", "--group", "trip", "--member", "nobody",
    ]);
    if let Some(("balance", m)) = matches.subcommand() {
        assert!(balances::handle(&conn, m).is_err());
    } else {
        panic!("no balance subcommand");
    }
}

#[test]
fn oversized_records_fail_cleanly() {
    let mut conn = setup();
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    let max = Decimal::MAX.to_string();
    assert!(
        store::insert_expense(&mut conn, &expense(Some(gid), day(1), &max, ALICE, &[(BOB, &max)]))
            .is_err()
    );
    assert!(store::insert_settlement(&conn, &settle(Some(gid), day(1), BOB, ALICE, &max)).is_err());

    // Rows written behind the store's back still must not crash the report.
    for id in [1, 2] {
        conn.execute(
            "INSERT INTO expenses(id, amount, payer_id, split_type, group_id, date, description)
             VALUES (?1, ?2, 1, 'AMOUNT', ?3, '2025-05-01', 'Huge')",
            rusqlite::params![id, max, gid],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO splits(expense_id, member_id, owed_amount, has_already_paid)
             VALUES (?1, 2, ?2, 0)",
            rusqlite::params![id, max],
        )
        .unwrap();
    }
    assert!(group_report(&conn, gid).is_err());
}

#[test]
fn negative_shares_are_not_stored() {
    let mut conn = setup();
    let lopsided = expense(None, day(1), "10", ALICE, &[(BOB, "11"), (CAROL, "-1")]);
    assert!(store::insert_expense(&mut conn, &lopsided).is_err());
    assert!(store::all_expenses(&conn).unwrap().is_empty());
}

#[test]
fn group_settlements_stay_out_of_the_pair_balance() {
    let mut conn = setup();
    store::insert_expense(&mut conn, &expense(None, day(1), "60", ALICE, &[(ALICE, "30"), (BOB, "30")]))
        .unwrap();
    let gid = utils::id_for_group(&conn, "trip").unwrap();
    store::insert_settlement(&conn, &settle(Some(gid), day(2), BOB, ALICE, "30")).unwrap();

    let report = pair_report(&conn, "alice", "bob", true).unwrap();
    assert_eq!(report.balance, d("30"));
    assert_eq!(report.total_settlements, Decimal::ZERO);
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.history[0].kind, "expense");

    // The same payment made outside the group does settle the pair.
    store::insert_settlement(&conn, &settle(None, day(3), BOB, ALICE, "30")).unwrap();
    let report = pair_report(&conn, "alice", "bob", false).unwrap();
    assert_eq!(report.balance, Decimal::ZERO);
}
