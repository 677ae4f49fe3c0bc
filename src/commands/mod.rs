// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod members;
pub mod groups;
pub mod expenses;
pub mod settlements;
pub mod balances;
pub mod exporter;
pub mod config;
pub mod doctor;
