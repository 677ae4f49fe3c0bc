// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use splitclip::engine::{
    Debt, LedgerError, Scope, accumulate, compute_ledger, pair_balance, simplify,
};
use splitclip::models::{Expense, MemberId, Settlement, Split, SplitType};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

const A: MemberId = MemberId(1);
const B: MemberId = MemberId(2);
const C: MemberId = MemberId(3);

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn expense(id: i64, amount: &str, payer: MemberId, shares: &[(MemberId, &str)]) -> Expense {
    Expense {
        id,
        amount: d(amount),
        payer_id: payer,
        split_type: SplitType::Amount,
        group_id: None,
        date: day(),
        description: format!("expense {}", id),
        splits: shares
            .iter()
            .map(|(m, owed)| Split {
                member_id: *m,
                owed_amount: d(owed),
                owed_percentage: Decimal::ZERO,
                has_already_paid: *m == payer,
            })
            .collect(),
    }
}

fn settlement(id: i64, from: MemberId, to: MemberId, amount: &str) -> Settlement {
    Settlement {
        id,
        sender_id: from,
        receiver_id: to,
        amount: d(amount),
        group_id: None,
        date: day(),
        note: String::new(),
    }
}

fn abc() -> Scope {
    Scope::new([A, B, C])
}

#[test]
fn equal_dinner_leaves_two_debts_to_payer() {
    let dinner = expense(1, "90", A, &[(A, "30"), (B, "30"), (C, "30")]);
    let result = compute_ledger(&abc(), &[dinner], &[]).unwrap();

    assert_eq!(result.owed.owed(B, A), d("30"));
    assert_eq!(result.owed.owed(C, A), d("30"));
    assert_eq!(result.owed.owed(A, B), Decimal::ZERO);
    assert_eq!(result.net.get(A), Some(d("60")));
    assert_eq!(result.net.get(B), Some(d("-30")));
    assert_eq!(result.net.get(C), Some(d("-30")));
    assert_eq!(result.net.total(), Decimal::ZERO);
    assert_eq!(result.total_expenses, d("90"));
}

#[test]
fn settlement_clears_the_debt() {
    let dinner = expense(1, "90", A, &[(A, "30"), (B, "30"), (C, "30")]);
    let paid = settlement(1, B, A, "30");
    let result = compute_ledger(&abc(), &[dinner], &[paid]).unwrap();

    assert_eq!(result.owed.owed(B, A), Decimal::ZERO);
    assert_eq!(result.net.get(B), Some(Decimal::ZERO));
    assert_eq!(result.net.get(A), Some(d("30")));
    assert_eq!(
        result.debts(),
        vec![Debt {
            from: C,
            to: A,
            amount: d("30")
        }]
    );
    assert_eq!(result.total_settlements, d("30"));
}

#[test]
fn mutual_debts_cancel() {
    let first = expense(1, "80", A, &[(A, "40"), (B, "40")]);
    let second = expense(2, "30", B, &[(A, "15"), (B, "15")]);
    let (raw, _) = accumulate(&abc(), &[first, second], &[]).unwrap();
    assert_eq!(raw.owed(B, A), d("40"));
    assert_eq!(raw.owed(A, B), d("15"));

    let owed = simplify(&raw);
    assert_eq!(owed.owed(B, A), d("25"));
    assert_eq!(owed.owed(A, B), Decimal::ZERO);
}

#[test]
fn overpayment_turns_into_a_credit() {
    let lunch = expense(1, "60", A, &[(A, "30"), (B, "30")]);
    let paid = settlement(1, B, A, "50");
    let result = compute_ledger(&Scope::new([A, B]), &[lunch], &[paid]).unwrap();

    assert_eq!(result.raw.owed(B, A), d("-20"));
    assert_eq!(result.owed.owed(A, B), d("20"));
    assert_eq!(result.owed.owed(B, A), Decimal::ZERO);
    assert_eq!(result.net.get(B), Some(d("20")));
}

#[test]
fn simplify_is_a_fixed_point() {
    let first = expense(1, "80", A, &[(A, "40"), (B, "40")]);
    let second = expense(2, "30", B, &[(A, "15"), (C, "15")]);
    let third = expense(3, "12", C, &[(A, "6"), (B, "6")]);
    let (raw, _) = accumulate(&abc(), &[first, second, third], &[]).unwrap();
    let once = simplify(&raw);
    assert_eq!(simplify(&once), once);
    for (from, to, amount) in once.entries() {
        assert!(amount > Decimal::ZERO);
        assert_eq!(once.owed(to, from), Decimal::ZERO);
    }
}

#[test]
fn paid_splits_are_skipped() {
    let mut taxi = expense(1, "30", A, &[(B, "15"), (C, "15")]);
    taxi.splits[1].has_already_paid = true;
    let (raw, net) = accumulate(&abc(), &[taxi], &[]).unwrap();
    assert_eq!(raw.owed(B, A), d("15"));
    assert_eq!(raw.owed(C, A), Decimal::ZERO);
    assert_eq!(net.get(A), Some(d("15")));
}

#[test]
fn malformed_splits_fold_as_stored() {
    let short = expense(1, "100", A, &[(B, "30")]);
    let (raw, net) = accumulate(&abc(), &[short], &[]).unwrap();
    assert_eq!(raw.owed(B, A), d("30"));
    assert_eq!(net.total(), Decimal::ZERO);
}

#[test]
fn members_outside_scope_are_rejected() {
    let stranger = MemberId(99);
    let by_stranger = expense(1, "10", stranger, &[(A, "10")]);
    assert!(matches!(
        accumulate(&abc(), &[by_stranger], &[]),
        Err(LedgerError::OutOfScope { member, .. }) if member == stranger
    ));

    let for_stranger = expense(2, "10", A, &[(stranger, "10")]);
    assert!(matches!(
        accumulate(&abc(), &[for_stranger], &[]),
        Err(LedgerError::OutOfScope { .. })
    ));

    let payment = settlement(1, A, stranger, "5");
    assert!(matches!(
        accumulate(&abc(), &[], &[payment]),
        Err(LedgerError::OutOfScope { .. })
    ));
}

#[test]
fn self_settlement_is_rejected() {
    let payment = settlement(1, B, B, "5");
    assert_eq!(
        accumulate(&abc(), &[], &[payment]).unwrap_err(),
        LedgerError::SelfPair(B)
    );
}

#[test]
fn empty_scope_gives_empty_result() {
    let result = compute_ledger(&Scope::new([]), &[], &[]).unwrap();
    assert!(result.net.is_empty());
    assert!(result.debts().is_empty());
    assert_eq!(result.owed.entries().count(), 0);
}

#[test]
fn scope_keeps_first_occurrence_order() {
    let scope = Scope::new([C, A, C, B]);
    assert_eq!(scope.members(), &[C, A, B]);
    assert_eq!(scope.position(B), Some(2));
    assert!(!scope.contains(MemberId(7)));
}

#[test]
fn member_position_lists_both_directions() {
    let dinner = expense(1, "90", A, &[(A, "30"), (B, "30"), (C, "30")]);
    let drinks = expense(2, "20", B, &[(C, "20")]);
    let result = compute_ledger(&abc(), &[dinner, drinks], &[]).unwrap();

    let b = result.position(B).unwrap();
    assert_eq!(b.net, d("-10"));
    assert_eq!(b.owes_to.len(), 1);
    assert_eq!(b.owes_to[0].to, A);
    assert_eq!(b.owes_from.len(), 1);
    assert_eq!(b.owes_from[0].from, C);
    assert!(result.position(MemberId(42)).is_none());
    assert_eq!(result.positions().len(), 3);
}

#[test]
fn pair_balance_matches_scenario() {
    let first = expense(1, "80", A, &[(A, "40"), (B, "40")]);
    let second = expense(2, "30", B, &[(A, "15"), (B, "15")]);
    let expenses = [first, second];

    let mine = pair_balance(A, B, &expenses, &[]).unwrap();
    assert_eq!(mine.balance, d("25"));
    assert_eq!(mine.expense_count, 2);
    assert_eq!(mine.total_expenses, d("110"));

    let theirs = pair_balance(B, A, &expenses, &[]).unwrap();
    assert_eq!(theirs.balance, -mine.balance);
}

#[test]
fn pair_balance_ignores_third_parties() {
    let dinner = expense(1, "90", A, &[(A, "30"), (B, "30"), (C, "30")]);
    let paid_by_c = expense(2, "40", C, &[(A, "20"), (B, "20")]);
    let only_a_and_c = expense(3, "10", A, &[(C, "10")]);
    let expenses = [dinner, paid_by_c, only_a_and_c];

    let pair = pair_balance(A, B, &expenses, &[]).unwrap();
    assert_eq!(pair.balance, d("30"));
    assert_eq!(pair.expense_count, 1);

    let paid = settlement(1, B, A, "30");
    let settled = pair_balance(A, B, &expenses, &[paid]).unwrap();
    assert_eq!(settled.balance, Decimal::ZERO);
    assert_eq!(settled.settlement_count, 1);
}

#[test]
fn pair_balance_errors() {
    assert_eq!(pair_balance(A, A, &[], &[]).unwrap_err(), LedgerError::SelfPair(A));
    let elsewhere = settlement(1, A, C, "5");
    assert!(matches!(
        pair_balance(A, B, &[], &[elsewhere]),
        Err(LedgerError::OutOfScope { .. })
    ));
}

#[test]
fn oversized_amounts_fail_instead_of_overflowing() {
    let max = Decimal::MAX.to_string();
    let first = expense(1, &max, A, &[(B, &max)]);
    let second = expense(2, &max, A, &[(B, &max)]);
    assert!(matches!(
        compute_ledger(&abc(), &[first, second], &[]),
        Err(LedgerError::InvalidAmount(_))
    ));

    let payment = settlement(1, B, A, &max);
    assert!(matches!(
        pair_balance(A, B, &[], &[payment]),
        Err(LedgerError::InvalidAmount(_))
    ));
}
