// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use super::ledger::PairwiseLedger;
use crate::models::MemberId;

/// A single directional obligation: `from` owes `to` a positive `amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Debt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

/// Cancel mutual obligations so every unordered pair keeps at most one
/// non-zero, non-negative entry.
///
/// Pairs are visited once each as `i < j` over the scope order. A simplified
/// ledger is a fixed point of this function.
pub fn simplify(ledger: &PairwiseLedger) -> PairwiseLedger {
    let mut out = ledger.clone();
    let n = ledger.scope().len();
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = ledger.at(i, j) - ledger.at(j, i);
            if diff > Decimal::ZERO {
                out.set_at(i, j, diff);
                out.set_at(j, i, Decimal::ZERO);
            } else if diff < Decimal::ZERO {
                out.set_at(i, j, Decimal::ZERO);
                out.set_at(j, i, diff.abs());
            } else {
                out.set_at(i, j, Decimal::ZERO);
                out.set_at(j, i, Decimal::ZERO);
            }
        }
    }
    out
}

impl PairwiseLedger {
    /// Positive entries as [`Debt`]s, in scope order.
    pub fn debts(&self) -> Vec<Debt> {
        self.entries()
            .filter(|(_, _, amount)| *amount > Decimal::ZERO)
            .map(|(from, to, amount)| Debt { from, to, amount })
            .collect()
    }

    /// Members `member` owes money to.
    pub fn owes_to(&self, member: MemberId) -> Vec<Debt> {
        self.debts().into_iter().filter(|d| d.from == member).collect()
    }

    /// Members who owe `member` money.
    pub fn owes_from(&self, member: MemberId) -> Vec<Debt> {
        self.debts().into_iter().filter(|d| d.to == member).collect()
    }
}
