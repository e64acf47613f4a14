// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain integration with the Curance insurance contracts.
//!
//! This module provides:
//! - Claim and policy records as the contracts expose them
//! - The `InsuranceLedger` façade the claim authorizer works against
//! - An alloy-backed client that reads state and sends oracle transactions

pub mod contracts;
pub mod ledger;
pub mod types;

pub use contracts::{ContractSettings, CuranceContracts};
pub use ledger::{ChainError, InsuranceLedger};
pub use types::*;
