// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read/write façade over the insurance contracts.

use alloy::primitives::{TxHash, B256};
use async_trait::async_trait;

use super::types::{Claim, ClaimStatus, Policy};

/// Errors that can occur during contract interactions.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Unknown claim status code: {0}")]
    UnknownStatus(u8),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out after {0}s waiting for {1}")]
    Timeout(u64, &'static str),
}

/// Contract operations the oracle relies on.
///
/// Reads report the contract's view of claims and policies. Writes return
/// only once the transaction receipt confirms success.
#[async_trait]
pub trait InsuranceLedger: Send + Sync {
    /// The claim record, or `None` if the contract has no such claim.
    async fn get_claim(&self, claim_id: B256) -> Result<Option<Claim>, ChainError>;

    async fn get_claim_status(&self, claim_id: B256) -> Result<ClaimStatus, ChainError>;

    /// Whether the policy is active and unexpired.
    async fn is_policy_valid(&self, commitment: B256) -> Result<bool, ChainError>;

    /// The policy record, or `None` if no policy uses the commitment.
    async fn get_policy(&self, commitment: B256) -> Result<Option<Policy>, ChainError>;

    /// Move a PENDING claim to ENABLED, which triggers settlement.
    async fn enable_claim(&self, claim_id: B256) -> Result<TxHash, ChainError>;

    /// Move a PENDING claim to REJECTED, recording `reason` on-chain.
    async fn reject_claim(&self, claim_id: B256, reason: &str) -> Result<TxHash, ChainError>;
}
