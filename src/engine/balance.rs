// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::LedgerError;
use super::ledger::{NetBalances, PairwiseLedger, Scope, accumulate, fold, warn_if_malformed};
use super::simplify::{Debt, simplify};
use super::split::checked_add;
use crate::models::{Expense, MemberId, Settlement};

#[derive(Debug, Clone)]
pub struct LedgerResult {
    /// Before simplification. Entries can be negative after overpayments.
    pub raw: PairwiseLedger,
    pub owed: PairwiseLedger,
    pub net: NetBalances,
    pub total_expenses: Decimal,
    pub total_settlements: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberPosition {
    pub member_id: MemberId,
    pub net: Decimal,
    pub owes_to: Vec<Debt>,
    pub owes_from: Vec<Debt>,
}

impl LedgerResult {
    pub fn debts(&self) -> Vec<Debt> {
        self.owed.debts()
    }

    pub fn position(&self, member: MemberId) -> Option<MemberPosition> {
        let net = self.net.get(member)?;
        Some(MemberPosition {
            member_id: member,
            net,
            owes_to: self.owed.owes_to(member),
            owes_from: self.owed.owes_from(member),
        })
    }

    pub fn positions(&self) -> Vec<MemberPosition> {
        self.owed
            .scope()
            .members()
            .iter()
            .filter_map(|m| self.position(*m))
            .collect()
    }
}

fn checked_total(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, LedgerError> {
    amounts.try_fold(Decimal::ZERO, checked_add)
}

/// Full recompute for one scope: accumulate, then simplify.
pub fn compute_ledger(
    scope: &Scope,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<LedgerResult, LedgerError> {
    let (raw, net) = accumulate(scope, expenses, settlements)?;
    let owed = simplify(&raw);
    Ok(LedgerResult {
        raw,
        owed,
        net,
        total_expenses: checked_total(expenses.iter().map(|e| e.amount))?,
        total_settlements: checked_total(settlements.iter().map(|s| s.amount))?,
    })
}

/// Balance between `member` and `other` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairBalance {
    pub member_id: MemberId,
    pub other_id: MemberId,
    /// Positive: `other` owes `member`. Negative: `member` owes `other`.
    pub balance: Decimal,
    pub total_expenses: Decimal,
    pub total_settlements: Decimal,
    pub expense_count: usize,
    pub settlement_count: usize,
}

/// Run the ledger over the two-member scope `{member, other}`.
///
/// Expenses count only when the payer is one of the two and both have a
/// split; splits of anyone else are ignored. Settlements must be between the
/// two members.
pub fn pair_balance(
    member: MemberId,
    other: MemberId,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<PairBalance, LedgerError> {
    if member == other {
        return Err(LedgerError::SelfPair(member));
    }
    let pair = [member, other];
    let relevant: Vec<&Expense> = expenses
        .iter()
        .filter(|e| pair.contains(&e.payer_id) && e.involves(member) && e.involves(other))
        .collect();
    relevant.iter().for_each(|e| warn_if_malformed(e));

    // Third-party splits are projected away before folding.
    let projected: Vec<Expense> = relevant
        .iter()
        .map(|e| Expense {
            splits: e
                .splits
                .iter()
                .filter(|s| pair.contains(&s.member_id))
                .cloned()
                .collect(),
            ..(*e).clone()
        })
        .collect();

    let scope = Scope::new(pair);
    let (raw, _) = fold(&scope, &projected, settlements)?;
    let owed = simplify(&raw);
    let balance = owed.owed(other, member) - owed.owed(member, other);
    Ok(PairBalance {
        member_id: member,
        other_id: other,
        balance,
        total_expenses: checked_total(relevant.iter().map(|e| e.amount))?,
        total_settlements: checked_total(settlements.iter().map(|s| s.amount))?,
        expense_count: relevant.len(),
        settlement_count: settlements.len(),
    })
}
