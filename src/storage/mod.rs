// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Oracle Storage
//!
//! Persistent state the oracle keeps next to the chain:
//!
//! - **Decision log**: every claim decision is written before the matching
//!   contract call is sent, so a retried request for a claim that is still
//!   PENDING replays the decision instead of re-running verification.
//! - **Registration index**: `commitment → healthDataHash` for policies
//!   registered through this oracle, used to recompute ownership commitments.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   oracle.redb     # claim_decisions, policy_registrations
//! ```

pub mod database;

pub use database::{
    DecisionAction, DecisionRecord, OracleDatabase, RegistrationRecord, StoreError, StoreResult,
};

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "oracle.redb";
