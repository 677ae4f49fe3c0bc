// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::LedgerError;
use crate::models::{MemberId, Split, SplitType};

/// Largest gap between an expense amount and the sum of its splits that is
/// still accepted when no `split_tolerance` setting exists.
pub fn default_split_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Largest absolute value accepted for any expense, split or settlement
/// amount. Keeps every ledger sum far from `Decimal::MAX`.
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

pub fn check_amount_limit(amount: Decimal, what: &str) -> Result<(), LedgerError> {
    if amount.abs() > max_amount() {
        return Err(LedgerError::InvalidAmount(format!(
            "{} exceeds the limit of {}, got {}",
            what,
            max_amount(),
            amount
        )));
    }
    Ok(())
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b)
        .ok_or_else(|| LedgerError::InvalidAmount(format!("sum of {} and {} overflows", a, b)))
}

/// How an `EQUAL` split treats the division remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Plain `amount / n` for every participant. The shares can drift from
    /// the total by a sub-cent amount.
    #[default]
    Legacy,
    /// Shares rounded to cents; the last participant absorbs the remainder so
    /// the total is exact.
    Strict,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Legacy => "legacy",
            SplitMode::Strict => "strict",
        }
    }
}

impl FromStr for SplitMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(SplitMode::Legacy),
            "strict" => Ok(SplitMode::Strict),
            _ => Err(LedgerError::UnknownSplitMode(s.trim().to_string())),
        }
    }
}

/// A participant plus the raw value the caller typed for them: a percentage
/// for `PERCENTAGE`, a sub-amount for `AMOUNT`, ignored for `EQUAL`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    pub member_id: MemberId,
    pub value: Option<Decimal>,
}

impl ShareRequest {
    pub fn member(member_id: MemberId) -> Self {
        Self {
            member_id,
            value: None,
        }
    }

    pub fn with_value(member_id: MemberId, value: Decimal) -> Self {
        Self {
            member_id,
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDiscrepancy {
    Exceeding(Decimal),
    Short(Decimal),
}

impl fmt::Display for SplitDiscrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitDiscrepancy::Exceeding(d) => write!(f, "Exceeding total amount by {}", d),
            SplitDiscrepancy::Short(d) => write!(f, "Less than total amount by {}", d),
        }
    }
}

/// Output of [`split_expense`]. Not validated: call
/// [`SplitDraft::discrepancy`] before committing.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDraft {
    pub amount: Decimal,
    pub splits: Vec<Split>,
}

impl SplitDraft {
    pub fn total(&self) -> Decimal {
        self.splits.iter().map(|s| s.owed_amount).sum()
    }

    pub fn discrepancy(&self, tolerance: Decimal) -> Option<SplitDiscrepancy> {
        let delta = self.total() - self.amount;
        if delta.abs() <= tolerance {
            None
        } else if delta > Decimal::ZERO {
            Some(SplitDiscrepancy::Exceeding(delta))
        } else {
            Some(SplitDiscrepancy::Short(delta.abs()))
        }
    }

    pub fn into_splits(self) -> Vec<Split> {
        self.splits
    }
}

/// Resolve each participant's owed amount for one expense.
///
/// The payer's own share is marked `has_already_paid`. A payer that is not a
/// participant is allowed; then every split is a debt to the payer.
pub fn split_expense(
    amount: Decimal,
    split_type: SplitType,
    payer: MemberId,
    participants: &[ShareRequest],
    mode: SplitMode,
) -> Result<SplitDraft, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "expense amount must be positive, got {}",
            amount
        )));
    }
    check_amount_limit(amount, "expense amount")?;
    if participants.is_empty() {
        return Err(LedgerError::NoParticipants);
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.member_id) {
            return Err(LedgerError::DuplicateParticipant(p.member_id));
        }
    }

    let shares = match split_type {
        SplitType::Equal => equal_shares(amount, participants.len(), mode),
        SplitType::Amount => {
            let mut out = Vec::with_capacity(participants.len());
            for p in participants {
                let owed = required_value(p, split_type)?;
                if owed < Decimal::ZERO {
                    return Err(LedgerError::InvalidAmount(format!(
                        "share for member {} cannot be negative, got {}",
                        p.member_id, owed
                    )));
                }
                check_amount_limit(owed, "share")?;
                out.push((owed, owed / amount * Decimal::ONE_HUNDRED));
            }
            out
        }
        SplitType::Percentage => {
            let mut out = Vec::with_capacity(participants.len());
            for p in participants {
                let pct = required_value(p, split_type)?;
                if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                    return Err(LedgerError::InvalidAmount(format!(
                        "percentage for member {} must be within 0..=100, got {}",
                        p.member_id, pct
                    )));
                }
                out.push((pct / Decimal::ONE_HUNDRED * amount, pct));
            }
            out
        }
    };

    let splits = participants
        .iter()
        .zip(shares)
        .map(|(p, (owed_amount, owed_percentage))| Split {
            member_id: p.member_id,
            owed_amount,
            owed_percentage,
            has_already_paid: p.member_id == payer,
        })
        .collect();

    Ok(SplitDraft { amount, splits })
}

fn required_value(p: &ShareRequest, kind: SplitType) -> Result<Decimal, LedgerError> {
    p.value.ok_or(LedgerError::MissingShare {
        member: p.member_id,
        kind,
    })
}

fn equal_shares(amount: Decimal, n: usize, mode: SplitMode) -> Vec<(Decimal, Decimal)> {
    let count = Decimal::from(n as u64);
    match mode {
        SplitMode::Legacy => {
            let share = amount / count;
            let pct = Decimal::ONE_HUNDRED / count;
            vec![(share, pct); n]
        }
        SplitMode::Strict => {
            // Truncate so the remainder left for the last share is never negative.
            let share = (amount / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
            let last = amount - share * Decimal::from((n - 1) as u64);
            let mut out = vec![(share, share / amount * Decimal::ONE_HUNDRED); n - 1];
            out.push((last, last / amount * Decimal::ONE_HUNDRED));
            out
        }
    }
}
