// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation, and use camelCase field names on the wire.
//!
//! Request fields that the handlers require are still `Option`s so that a
//! missing field produces the endpoint's own structured 400 response.
//!
//! ## Model Categories
//!
//! - **Registration**: health attestation or legacy proof checks
//! - **Claims**: claim verification, claim records and status
//! - **Policies**: policy lookups
//! - **Service**: root and health responses

use alloy::primitives::U256;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::attestation::Attestation;
use crate::chain::{Claim, ClaimStatus, Policy};
use crate::legacy::{HealthProof, InvoiceProof};
use crate::ownership::OwnershipProof;

/// Format Unix seconds as an ISO-8601 UTC timestamp with milliseconds.
pub fn unix_to_iso(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as an ISO-8601 UTC timestamp with milliseconds.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Registration Models
// =============================================================================

/// Request to verify health evidence before a policy is registered on-chain.
///
/// Exactly one of `attestation` and `proof` must be supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Policy commitment, `keccak256(secret ‖ healthDataHash)`.
    #[serde(default)]
    pub commitment: Option<String>,
    #[serde(default)]
    pub health_data_hash: Option<String>,
    #[serde(default)]
    pub premium: Option<String>,
    /// zkTLS attestation over the claimant's health record.
    #[serde(default)]
    pub attestation: Option<Attestation>,
    /// Legacy hospital-signed health proof.
    #[serde(default)]
    pub proof: Option<HealthProof>,
}

/// Verified registration details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    #[schema(value_type = Object)]
    pub health_data: Value,
    pub attestors: Vec<String>,
    /// Attestation timestamp (milliseconds since the Unix epoch).
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub verified: bool,
    /// Present for attestation-based registrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RegistrationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RegisterResponse {
    pub fn verified(data: Option<RegistrationData>) -> Self {
        Self {
            success: true,
            verified: true,
            data,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            verified: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Claim Models
// =============================================================================

/// Request to verify a claim and settle or reject it on-chain.
///
/// Exactly one of `invoiceAttestation` and `invoiceProof` must be supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyClaimRequest {
    #[serde(default)]
    pub claim_id: Option<String>,
    #[serde(default)]
    pub invoice_attestation: Option<Attestation>,
    #[serde(default)]
    pub invoice_proof: Option<InvoiceProof>,
    #[serde(default)]
    pub ownership_proof: Option<OwnershipProof>,
}

/// Outcome of a claim verification.
///
/// `status` is `ENABLED` on success, otherwise `REJECTED`, `NOT_FOUND`,
/// `INVALID_REQUEST`, `ERROR` or the claim's current status when it is not
/// pending.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyClaimResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    pub status: String,
    /// Hash of the `enableClaim` or `rejectClaim` transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Attested invoice data, for attestation-based claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub invoice_data: Option<Value>,
}

impl VerifyClaimResponse {
    pub fn failure(
        claim_id: Option<String>,
        status: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            claim_id,
            status: status.into(),
            transaction_hash: None,
            error: Some(error.into()),
            invoice_data: None,
        }
    }
}

/// Full claim record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub claim_id: String,
    pub status: ClaimStatus,
    pub policy_commitment: String,
    pub hospital: String,
    /// Amount in USDC base units, as a decimal string.
    pub amount: String,
    pub invoice_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ClaimResponse {
    pub fn new(claim_id: String, claim: &Claim) -> Self {
        Self {
            claim_id,
            status: claim.status,
            policy_commitment: claim.policy_commitment.to_string(),
            hospital: claim.hospital.to_checksum(None),
            amount: claim.amount.to_string(),
            invoice_hash: claim.invoice_hash.to_string(),
            created_at: unix_to_iso(claim.created_at),
            updated_at: unix_to_iso(claim.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusResponse {
    pub claim_id: String,
    pub status: ClaimStatus,
    pub status_code: u8,
}

// =============================================================================
// Policy Models
// =============================================================================

/// Policy record with its current validity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub commitment: String,
    pub premium: String,
    pub coverage_amount: String,
    pub used_coverage: String,
    pub remaining_coverage: String,
    pub start_time: String,
    pub expiry_time: String,
    pub is_active: bool,
    /// Contract view: active and unexpired.
    pub is_valid: bool,
    /// Whether the policy's health evidence was verified by this oracle.
    pub registered: bool,
}

impl PolicyResponse {
    pub fn new(commitment: String, policy: &Policy, is_valid: bool, registered: bool) -> Self {
        let amount = |value: U256| value.to_string();
        Self {
            commitment,
            premium: amount(policy.premium),
            coverage_amount: amount(policy.coverage_amount),
            used_coverage: amount(policy.used_coverage),
            remaining_coverage: amount(policy.remaining_coverage()),
            start_time: unix_to_iso(policy.start_time),
            expiry_time: unix_to_iso(policy.expiry_time),
            is_active: policy.is_active,
            is_valid,
            registered,
        }
    }
}

// =============================================================================
// Service Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RootResponse {
    pub service: String,
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContractsInfo {
    pub registry: String,
    pub claims: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub timestamp: String,
    pub contracts: ContractsInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256};

    #[test]
    fn iso_timestamps_have_millis() {
        assert_eq!(unix_to_iso(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(unix_to_iso(1_735_689_600), "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn verify_request_accepts_partial_bodies() {
        let req: VerifyClaimRequest = serde_json::from_str(r#"{"claimId":"0xaa"}"#).unwrap();
        assert_eq!(req.claim_id.as_deref(), Some("0xaa"));
        assert!(req.ownership_proof.is_none());
        assert!(req.invoice_attestation.is_none());
    }

    #[test]
    fn failure_response_omits_empty_fields() {
        let json = serde_json::to_value(VerifyClaimResponse::failure(
            None,
            "INVALID_REQUEST",
            "bad",
        ))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "status": "INVALID_REQUEST", "error": "bad"})
        );
    }

    #[test]
    fn claim_response_formats_fields() {
        let claim = Claim {
            policy_commitment: B256::repeat_byte(0xcc),
            hospital: Address::repeat_byte(0x11),
            amount: U256::from(1_500_000_000u64),
            invoice_hash: B256::repeat_byte(0xee),
            status: ClaimStatus::Pending,
            created_at: 1_735_689_600,
            updated_at: 1_735_689_660,
        };
        let json = serde_json::to_value(ClaimResponse::new("0xaa".into(), &claim)).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["amount"], "1500000000");
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00.000Z");
        assert_eq!(json["updatedAt"], "2025-01-01T00:01:00.000Z");
        assert_eq!(json["policyCommitment"], B256::repeat_byte(0xcc).to_string());
    }

    #[test]
    fn policy_response_reports_remaining_coverage() {
        let policy = Policy {
            premium: U256::from(100),
            coverage_amount: U256::from(10_000),
            used_coverage: U256::from(2_500),
            start_time: 1_735_689_600,
            expiry_time: 1_767_225_600,
            is_active: true,
        };
        let response = PolicyResponse::new("0xcc".into(), &policy, true, false);
        assert_eq!(response.remaining_coverage, "7500");
        assert_eq!(response.expiry_time, "2026-01-01T00:00:00.000Z");
    }
}
