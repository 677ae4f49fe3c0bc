// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use splitclip::engine::{
    LedgerError, ShareRequest, SplitDiscrepancy, SplitMode, default_split_tolerance, split_expense,
};
use splitclip::models::{MemberId, SplitType};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

const A: MemberId = MemberId(1);
const B: MemberId = MemberId(2);
const C: MemberId = MemberId(3);

fn everyone() -> Vec<ShareRequest> {
    [A, B, C].into_iter().map(ShareRequest::member).collect()
}

#[test]
fn equal_split_of_ninety_between_three() {
    let draft = split_expense(d("90"), SplitType::Equal, A, &everyone(), SplitMode::Legacy).unwrap();
    assert_eq!(draft.splits.len(), 3);
    for s in &draft.splits {
        assert_eq!(s.owed_amount, d("30"));
        assert_eq!(s.has_already_paid, s.member_id == A);
    }
    assert_eq!(draft.total(), d("90"));
    assert_eq!(draft.discrepancy(default_split_tolerance()), None);
}

#[test]
fn legacy_equal_split_drifts_within_tolerance() {
    let draft = split_expense(d("100"), SplitType::Equal, A, &everyone(), SplitMode::Legacy).unwrap();
    assert_ne!(draft.total(), d("100"));
    assert!((draft.total() - d("100")).abs() < d("0.01"));
    assert_eq!(draft.discrepancy(default_split_tolerance()), None);
}

#[test]
fn strict_equal_split_puts_remainder_on_last_participant() {
    let draft = split_expense(d("100"), SplitType::Equal, A, &everyone(), SplitMode::Strict).unwrap();
    let owed: Vec<Decimal> = draft.splits.iter().map(|s| s.owed_amount).collect();
    assert_eq!(owed, vec![d("33.33"), d("33.33"), d("33.34")]);
    assert_eq!(draft.total(), d("100"));
}

#[test]
fn percentage_split_derives_amounts() {
    let shares = vec![
        ShareRequest::with_value(A, d("40")),
        ShareRequest::with_value(B, d("60")),
    ];
    let draft = split_expense(d("200"), SplitType::Percentage, A, &shares, SplitMode::Legacy).unwrap();
    assert_eq!(draft.splits[0].owed_amount, d("80"));
    assert_eq!(draft.splits[1].owed_amount, d("120"));
    assert_eq!(draft.splits[1].owed_percentage, d("60"));
    assert!(draft.splits[0].has_already_paid);
    assert!(!draft.splits[1].has_already_paid);
}

#[test]
fn amount_split_derives_percentages() {
    let shares = vec![
        ShareRequest::with_value(B, d("50")),
        ShareRequest::with_value(C, d("150")),
    ];
    let draft = split_expense(d("200"), SplitType::Amount, A, &shares, SplitMode::Legacy).unwrap();
    assert_eq!(draft.splits[0].owed_percentage, d("25"));
    assert_eq!(draft.splits[1].owed_percentage, d("75"));
    // Payer is not a participant: nobody is marked paid.
    assert!(draft.splits.iter().all(|s| !s.has_already_paid));
}

#[test]
fn amount_split_reports_shortfall_and_excess() {
    let short = vec![
        ShareRequest::with_value(A, d("60")),
        ShareRequest::with_value(B, d("30")),
    ];
    let draft = split_expense(d("100"), SplitType::Amount, A, &short, SplitMode::Legacy).unwrap();
    let gap = draft.discrepancy(default_split_tolerance()).unwrap();
    assert_eq!(gap, SplitDiscrepancy::Short(d("10")));
    assert_eq!(gap.to_string(), "Less than total amount by 10");

    let over = vec![
        ShareRequest::with_value(A, d("60")),
        ShareRequest::with_value(B, d("45")),
    ];
    let draft = split_expense(d("100"), SplitType::Amount, A, &over, SplitMode::Legacy).unwrap();
    assert_eq!(
        draft.discrepancy(default_split_tolerance()),
        Some(SplitDiscrepancy::Exceeding(d("5")))
    );
}

#[test]
fn percentages_below_hundred_are_short() {
    let shares = vec![
        ShareRequest::with_value(A, d("50")),
        ShareRequest::with_value(B, d("30")),
    ];
    let draft = split_expense(d("50"), SplitType::Percentage, A, &shares, SplitMode::Legacy).unwrap();
    assert_eq!(
        draft.discrepancy(default_split_tolerance()),
        Some(SplitDiscrepancy::Short(d("10")))
    );
}

#[test]
fn rejects_bad_requests() {
    assert_eq!(
        split_expense(d("10"), SplitType::Equal, A, &[], SplitMode::Legacy),
        Err(LedgerError::NoParticipants)
    );
    assert!(matches!(
        split_expense(d("0"), SplitType::Equal, A, &everyone(), SplitMode::Legacy),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert_eq!(
        split_expense(
            d("10"),
            SplitType::Equal,
            A,
            &[ShareRequest::member(B), ShareRequest::member(B)],
            SplitMode::Legacy
        ),
        Err(LedgerError::DuplicateParticipant(B))
    );
    assert_eq!(
        split_expense(d("10"), SplitType::Amount, A, &[ShareRequest::member(B)], SplitMode::Legacy),
        Err(LedgerError::MissingShare {
            member: B,
            kind: SplitType::Amount
        })
    );
    assert!(matches!(
        split_expense(
            d("10"),
            SplitType::Percentage,
            A,
            &[ShareRequest::with_value(B, d("120"))],
            SplitMode::Legacy
        ),
        Err(LedgerError::InvalidAmount(_))
    ));
}

#[test]
fn split_names_parse_case_insensitively() {
    assert_eq!("equal".parse::<SplitType>().unwrap(), SplitType::Equal);
    assert_eq!("Percentage".parse::<SplitType>().unwrap(), SplitType::Percentage);
    assert_eq!(
        "shares".parse::<SplitType>(),
        Err(LedgerError::UnknownSplitType("shares".into()))
    );
    assert_eq!("STRICT".parse::<SplitMode>().unwrap(), SplitMode::Strict);
    assert!("exact".parse::<SplitMode>().is_err());
}

#[test]
fn strict_split_never_hands_out_a_negative_share() {
    let seven: Vec<ShareRequest> = (1..=7).map(|i| ShareRequest::member(MemberId(i))).collect();
    let draft = split_expense(d("0.11"), SplitType::Equal, A, &seven, SplitMode::Strict).unwrap();
    let owed: Vec<Decimal> = draft.splits.iter().map(|s| s.owed_amount).collect();
    assert_eq!(&owed[..6], &[d("0.01"); 6]);
    assert_eq!(owed[6], d("0.05"));
    assert!(owed.iter().all(|o| *o >= Decimal::ZERO));
    assert_eq!(draft.total(), d("0.11"));
}

#[test]
fn amounts_above_the_limit_are_rejected() {
    assert!(matches!(
        split_expense(
            d("1000000000000000.01"),
            SplitType::Equal,
            A,
            &everyone(),
            SplitMode::Legacy
        ),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert!(matches!(
        split_expense(
            d("10"),
            SplitType::Amount,
            A,
            &[ShareRequest::with_value(B, Decimal::MAX)],
            SplitMode::Legacy
        ),
        Err(LedgerError::InvalidAmount(_))
    ));
}
