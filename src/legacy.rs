// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legacy proof checks.
//!
//! Clients that predate zkTLS attestations send hospital-signed proofs that
//! are only checked structurally. They are kept for backward compatibility
//! and give much weaker guarantees than an attestation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attestation::verifier::ATTESTATION_VALIDITY_MS;

/// Legacy health proof presented at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthProof {
    #[serde(default)]
    pub signature: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub hospital_id: String,
}

/// Legacy invoice proof presented with a claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceProof {
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub invoice_hash: String,
    #[serde(default)]
    pub hospital_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LegacyProofError {
    #[error("proof is missing required fields")]
    MissingFields,

    #[error("proof is older than 24 hours")]
    Stale,
}

/// Check a legacy health proof as of `now_ms`.
pub fn verify_health_proof_at(proof: &HealthProof, now_ms: i64) -> Result<(), LegacyProofError> {
    if proof.signature.is_empty() || proof.hospital_id.is_empty() || proof.timestamp == 0 {
        return Err(LegacyProofError::MissingFields);
    }

    let age = i128::from(now_ms) - i128::from(proof.timestamp);
    if age > i128::from(ATTESTATION_VALIDITY_MS) {
        return Err(LegacyProofError::Stale);
    }
    Ok(())
}

pub fn verify_health_proof(proof: &HealthProof) -> Result<(), LegacyProofError> {
    verify_health_proof_at(proof, chrono::Utc::now().timestamp_millis())
}

/// Check a legacy invoice proof. The invoice hash is compared against the
/// claim separately.
pub fn verify_invoice_proof(proof: &InvoiceProof) -> Result<(), LegacyProofError> {
    if proof.signature.is_empty() || proof.hospital_id.is_empty() || proof.invoice_hash.is_empty()
    {
        return Err(LegacyProofError::MissingFields);
    }
    Ok(())
}
