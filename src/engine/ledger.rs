// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use super::LedgerError;
use super::split::{check_amount_limit, checked_add, default_split_tolerance};
use crate::models::{Expense, MemberId, Settlement};

/// Index-stable member list for one computation. Duplicates are dropped,
/// keeping the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    members: Vec<MemberId>,
    index: HashMap<MemberId, usize>,
}

impl Scope {
    pub fn new<I: IntoIterator<Item = MemberId>>(members: I) -> Self {
        let mut scope = Scope::default();
        for m in members {
            if !scope.index.contains_key(&m) {
                scope.index.insert(m, scope.members.len());
                scope.members.push(m);
            }
        }
        scope
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member: MemberId) -> bool {
        self.index.contains_key(&member)
    }

    pub fn position(&self, member: MemberId) -> Option<usize> {
        self.index.get(&member).copied()
    }

    fn require(
        &self,
        member: MemberId,
        context: impl FnOnce() -> String,
    ) -> Result<usize, LedgerError> {
        self.position(member).ok_or_else(|| LedgerError::OutOfScope {
            member,
            context: context(),
        })
    }
}

/// `owed(a, b)`: what `a` owes `b`. Stored as a dense row-major matrix over
/// the scope; the diagonal stays zero.
#[derive(Debug, Clone)]
pub struct PairwiseLedger {
    scope: Scope,
    cells: Vec<Decimal>,
}

impl PairwiseLedger {
    pub fn new(scope: Scope) -> Self {
        let n = scope.len();
        Self {
            scope,
            cells: vec![Decimal::ZERO; n * n],
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Zero when either member is outside the scope.
    pub fn owed(&self, debtor: MemberId, creditor: MemberId) -> Decimal {
        match (self.scope.position(debtor), self.scope.position(creditor)) {
            (Some(i), Some(j)) => self.at(i, j),
            _ => Decimal::ZERO,
        }
    }

    /// Non-zero directional entries in scope order.
    pub fn entries(&self) -> impl Iterator<Item = (MemberId, MemberId, Decimal)> + '_ {
        let members = self.scope.members();
        (0..members.len()).flat_map(move |i| {
            (0..members.len()).filter_map(move |j| {
                let v = self.at(i, j);
                (i != j && !v.is_zero()).then(|| (members[i], members[j], v))
            })
        })
    }

    pub(crate) fn at(&self, i: usize, j: usize) -> Decimal {
        self.cells[i * self.scope.len() + j]
    }

    pub(crate) fn set_at(&mut self, i: usize, j: usize, value: Decimal) {
        let n = self.scope.len();
        self.cells[i * n + j] = value;
    }

    fn add_at(&mut self, i: usize, j: usize, delta: Decimal) -> Result<(), LedgerError> {
        let n = self.scope.len();
        let cell = &mut self.cells[i * n + j];
        *cell = checked_add(*cell, delta)?;
        Ok(())
    }
}

impl PartialEq for PairwiseLedger {
    fn eq(&self, other: &Self) -> bool {
        self.scope.members() == other.scope.members() && self.cells == other.cells
    }
}

/// Signed position per member: positive means the others owe this member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetBalances {
    entries: Vec<(MemberId, Decimal)>,
}

impl NetBalances {
    fn zeroed(scope: &Scope) -> Self {
        Self {
            entries: scope.members().iter().map(|m| (*m, Decimal::ZERO)).collect(),
        }
    }

    pub fn get(&self, member: MemberId) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(m, _)| *m == member)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, Decimal)> + '_ {
        self.entries.iter().copied()
    }

    /// Zero for any closed scope.
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|(_, v)| *v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add_at(&mut self, i: usize, delta: Decimal) -> Result<(), LedgerError> {
        self.entries[i].1 = checked_add(self.entries[i].1, delta)?;
        Ok(())
    }
}

/// Fold expenses and settlements into the raw (unsimplified) pairwise table
/// and the per-member net balances.
///
/// Fails on the first record that names a member outside `scope` or a
/// settlement whose sender is its receiver. Split totals that do not match
/// the expense amount are folded as stored and only logged.
pub fn accumulate(
    scope: &Scope,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<(PairwiseLedger, NetBalances), LedgerError> {
    expenses.iter().for_each(warn_if_malformed);
    fold(scope, expenses, settlements)
}

pub(crate) fn warn_if_malformed(expense: &Expense) {
    // Out-of-range amounts are rejected by `fold`; nothing to warn about here.
    let Some(split_total) = expense
        .splits
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.owed_amount))
    else {
        return;
    };
    let Some(delta) = split_total.checked_sub(expense.amount) else {
        return;
    };
    if delta.abs() > default_split_tolerance() {
        tracing::warn!(
            expense_id = expense.id,
            amount = %expense.amount,
            split_total = %split_total,
            "split total does not match expense amount; folding as stored"
        );
    }
}

pub(crate) fn fold(
    scope: &Scope,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<(PairwiseLedger, NetBalances), LedgerError> {
    let mut owed = PairwiseLedger::new(scope.clone());
    let mut net = NetBalances::zeroed(scope);

    for expense in expenses {
        let payer = scope.require(expense.payer_id, || {
            format!("payer of expense {}", expense.id)
        })?;
        check_amount_limit(expense.amount, &format!("expense {}", expense.id))?;
        for split in &expense.splits {
            let debtor = scope.require(split.member_id, || {
                format!("split of expense {}", expense.id)
            })?;
            if debtor == payer || split.has_already_paid {
                continue;
            }
            check_amount_limit(split.owed_amount, &format!("split of expense {}", expense.id))?;
            owed.add_at(debtor, payer, split.owed_amount)?;
            net.add_at(payer, split.owed_amount)?;
            net.add_at(debtor, -split.owed_amount)?;
        }
    }

    for settlement in settlements {
        if settlement.sender_id == settlement.receiver_id {
            return Err(LedgerError::SelfPair(settlement.sender_id));
        }
        let sender = scope.require(settlement.sender_id, || {
            format!("sender of settlement {}", settlement.id)
        })?;
        let receiver = scope.require(settlement.receiver_id, || {
            format!("receiver of settlement {}", settlement.id)
        })?;
        check_amount_limit(settlement.amount, &format!("settlement {}", settlement.id))?;
        // Can go negative: an overpayment becomes a credit.
        owed.add_at(sender, receiver, -settlement.amount)?;
        net.add_at(sender, settlement.amount)?;
        net.add_at(receiver, -settlement.amount)?;
    }

    if !net.total().is_zero() {
        tracing::warn!(total = %net.total(), "net balances do not sum to zero");
    }
    tracing::debug!(
        members = scope.len(),
        expenses = expenses.len(),
        settlements = settlements.len(),
        "accumulated pairwise ledger"
    );
    Ok((owed, net))
}
