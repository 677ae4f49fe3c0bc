// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::LedgerError;

/// Opaque member key. The engine never looks inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub admin_id: MemberId,
    pub members: Vec<MemberId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitType {
    Equal,
    Percentage,
    Amount,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "EQUAL",
            SplitType::Percentage => "PERCENTAGE",
            SplitType::Amount => "AMOUNT",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(SplitType::Equal),
            "PERCENTAGE" => Ok(SplitType::Percentage),
            "AMOUNT" => Ok(SplitType::Amount),
            _ => Err(LedgerError::UnknownSplitType(s.trim().to_string())),
        }
    }
}

/// One participant's share of an [`Expense`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub member_id: MemberId,
    pub owed_amount: Decimal,
    pub owed_percentage: Decimal, // informational
    pub has_already_paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    pub payer_id: MemberId,
    pub split_type: SplitType,
    pub group_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub splits: Vec<Split>,
}

impl Expense {
    pub fn split_total(&self) -> Decimal {
        self.splits.iter().map(|s| s.owed_amount).sum()
    }

    pub fn involves(&self, member: MemberId) -> bool {
        self.splits.iter().any(|s| s.member_id == member)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: i64,
    pub sender_id: MemberId,
    pub receiver_id: MemberId,
    pub amount: Decimal,
    pub group_id: Option<i64>,
    pub date: NaiveDate,
    pub note: String,
}
