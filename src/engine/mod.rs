// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Debt-settlement engine.
//!
//! Three stages run over an in-memory snapshot of one scope (a group, or a
//! pair of members):
//!
//! 1. [`split_expense`] resolves each participant's share of an expense.
//! 2. [`accumulate`] folds expenses and settlements into a [`PairwiseLedger`]
//!    and [`NetBalances`].
//! 3. [`simplify`] cancels mutual obligations so each pair keeps at most one
//!    directional debt.
//!
//! [`compute_ledger`] and [`pair_balance`] run the whole pipeline. Nothing is
//! cached between calls.

use thiserror::Error;

use crate::models::{MemberId, SplitType};

mod balance;
mod ledger;
mod simplify;
mod split;

pub use balance::{LedgerResult, MemberPosition, PairBalance, compute_ledger, pair_balance};
pub use ledger::{NetBalances, PairwiseLedger, Scope, accumulate};
pub use simplify::{Debt, simplify};
pub use split::{
    ShareRequest, SplitDiscrepancy, SplitDraft, SplitMode, check_amount_limit,
    default_split_tolerance, max_amount, split_expense,
};

/// Errors surfaced by the engine. Every variant aborts the computation that
/// raised it; nothing is partially applied.
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    #[error("Member {member} is outside the ledger scope ({context})")]
    OutOfScope { member: MemberId, context: String },
    #[error("Sender and receiver are both member {0}")]
    SelfPair(MemberId),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("An expense needs at least one participant")]
    NoParticipants,
    #[error("Member {0} appears more than once in the split")]
    DuplicateParticipant(MemberId),
    #[error("Missing {kind} share for member {member}")]
    MissingShare { member: MemberId, kind: SplitType },
    #[error("Unknown split type '{0}' (use equal|percentage|amount)")]
    UnknownSplitType(String),
    #[error("Unknown split mode '{0}' (use legacy|strict)")]
    UnknownSplitMode(String),
}
