// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Curance Oracle - Attestation Verification & Claim Settlement
//!
//! This crate provides the off-chain oracle of the Curance health-insurance
//! protocol. It verifies zkTLS attestations about health records and
//! medical invoices, proves policy ownership, and enables or rejects
//! insurance claims on the claims contract.
//!
//! ## Modules
//!
//! - `attestation` - Attestation codec, signer recovery and verification
//! - `legacy` - Pre-attestation proof checks
//! - `ownership` - Policy ownership proofs
//! - `claims` - Claim authorization
//! - `chain` - Registry and claims contract integration
//! - `storage` - Decision log and registration index (redb)
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod attestation;
pub mod chain;
pub mod claims;
pub mod config;
pub mod error;
pub mod legacy;
pub mod models;
pub mod ownership;
pub mod state;
pub mod storage;
