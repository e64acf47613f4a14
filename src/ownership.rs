// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Policy ownership proofs.
//!
//! A policy is keyed by `commitment = keccak256(secret ‖ healthDataHash)`.
//! A claimant proves ownership by revealing the secret; the oracle
//! recomputes the commitment from the `healthDataHash` recorded when the
//! policy was registered through it.
//!
//! Legacy clients send a signature instead of the secret. That path only
//! checks that the commitment matches and does not prove secret knowledge.

use std::str::FromStr;

use alloy::{
    primitives::{keccak256, B256},
    sol_types::SolValue,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ownership proof supplied with a claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OwnershipProof {
    #[serde(default)]
    pub commitment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// How ownership was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPath {
    /// The secret was checked against the registered health-data hash.
    SecretRecomputed,
    /// The secret was accepted without a registered hash (non-strict mode).
    SecretUnchecked,
    /// Legacy signature proof.
    LegacySignature,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("Commitment does not match claim policy")]
    CommitmentMismatch,

    #[error("Ownership secret must be a 32-byte hex value")]
    MalformedSecret,

    #[error("Secret does not match policy commitment")]
    SecretMismatch,

    #[error("Policy commitment was not registered with this oracle")]
    UnregisteredPolicy,

    #[error("Ownership proof verification failed")]
    LegacyProofInvalid,
}

/// `keccak256(abi.encodePacked(secret, healthDataHash))`.
pub fn compute_commitment(secret: &B256, health_data_hash: &B256) -> B256 {
    keccak256((*secret, *health_data_hash).abi_encode_packed())
}

/// Checks ownership proofs against a claim's policy commitment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipProver {
    strict: bool,
}

impl OwnershipProver {
    /// In strict mode a secret is only accepted when the policy's
    /// health-data hash is known and the recomputed commitment matches.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn prove(
        &self,
        proof: &OwnershipProof,
        policy_commitment: &B256,
        health_data_hash: Option<&B256>,
    ) -> Result<OwnershipPath, OwnershipError> {
        let claimed = B256::from_str(proof.commitment.trim())
            .map_err(|_| OwnershipError::CommitmentMismatch)?;
        if claimed != *policy_commitment {
            return Err(OwnershipError::CommitmentMismatch);
        }

        match non_empty(&proof.secret) {
            Some(secret) => self.prove_secret(secret, policy_commitment, health_data_hash),
            None => match non_empty(&proof.signature) {
                Some(_) => Ok(OwnershipPath::LegacySignature),
                None => Err(OwnershipError::LegacyProofInvalid),
            },
        }
    }

    fn prove_secret(
        &self,
        secret: &str,
        policy_commitment: &B256,
        health_data_hash: Option<&B256>,
    ) -> Result<OwnershipPath, OwnershipError> {
        let secret = B256::from_str(secret.trim()).map_err(|_| OwnershipError::MalformedSecret)?;

        match health_data_hash {
            Some(hash) if compute_commitment(&secret, hash) == *policy_commitment => {
                Ok(OwnershipPath::SecretRecomputed)
            }
            Some(_) => Err(OwnershipError::SecretMismatch),
            None if self.strict => Err(OwnershipError::UnregisteredPolicy),
            None => {
                tracing::warn!(
                    commitment = %policy_commitment,
                    "No registered health data hash, accepting ownership secret unchecked"
                );
                Ok(OwnershipPath::SecretUnchecked)
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
