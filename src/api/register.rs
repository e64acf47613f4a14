// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Policy registration checks.
//!
//! The claimant presents health evidence before registering a policy on the
//! registry contract. The oracle verifies it and records which
//! `healthDataHash` the commitment was built from, so ownership secrets can
//! later be checked against it.

use std::str::FromStr;

use alloy::primitives::B256;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::legacy;
use crate::models::{RegisterRequest, RegisterResponse, RegistrationData};
use crate::state::AppState;
use crate::storage::RegistrationRecord;

type RegisterReply = (StatusCode, Json<RegisterResponse>);

fn bad_request(error: impl Into<String>) -> RegisterReply {
    (
        StatusCode::BAD_REQUEST,
        Json(RegisterResponse::failed(error)),
    )
}

/// Verify health evidence for a policy registration.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Registration",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Health evidence verified", body = RegisterResponse),
        (status = 400, description = "Invalid request or evidence", body = RegisterResponse),
        (status = 500, description = "Storage failure", body = RegisterResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> RegisterReply {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return bad_request(format!("Invalid request body: {}", rejection.body_text()))
        }
    };

    let (Some(commitment), Some(health_data_hash), Some(premium)) = (
        non_empty(request.commitment),
        non_empty(request.health_data_hash),
        non_empty(request.premium),
    ) else {
        return bad_request("Missing required fields: commitment, healthDataHash, premium");
    };

    let (Ok(commitment), Ok(health_data_hash)) = (
        B256::from_str(&commitment),
        B256::from_str(&health_data_hash),
    ) else {
        return bad_request("commitment and healthDataHash must be 32-byte hex values");
    };

    tracing::info!(
        commitment = %commitment,
        health_data_hash = %health_data_hash,
        premium = %premium,
        has_attestation = request.attestation.is_some(),
        has_legacy_proof = request.proof.is_some(),
        "Registration request received"
    );

    let (record, data) = match (request.attestation, request.proof) {
        (Some(_), Some(_)) => {
            return bad_request("Provide either attestation or proof, not both");
        }
        (None, None) => {
            return bad_request("Missing proof: provide either attestation or proof (legacy)");
        }
        (Some(attestation), None) => match state.verifier.verify_health(&attestation) {
            Ok(verified) => {
                let attestors: Vec<String> = verified
                    .attestors
                    .iter()
                    .map(|a| a.to_checksum(None))
                    .collect();
                let record = RegistrationRecord::new(&commitment, &health_data_hash, premium)
                    .with_attestors(attestors.clone());
                let data = RegistrationData {
                    health_data: verified.data,
                    attestors,
                    timestamp: verified.timestamp,
                };
                (record, Some(data))
            }
            Err(e) => {
                tracing::info!(commitment = %commitment, error = %e, "Health attestation rejected");
                return bad_request(e.to_string());
            }
        },
        (None, Some(proof)) => match legacy::verify_health_proof(&proof) {
            Ok(()) => (
                RegistrationRecord::new(&commitment, &health_data_hash, premium),
                None,
            ),
            Err(e) => {
                tracing::info!(commitment = %commitment, error = %e, "Legacy health proof rejected");
                return bad_request("Health proof verification failed");
            }
        },
    };

    match state.db.register_policy(&record) {
        Ok(true) => tracing::info!(commitment = %commitment, "Policy registration recorded"),
        Ok(false) => tracing::info!(
            commitment = %commitment,
            "Commitment already registered, keeping the first registration"
        ),
        Err(e) => {
            tracing::error!(commitment = %commitment, error = %e, "Failed to record registration");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResponse::failed(e.to_string())),
            );
        }
    }

    (StatusCode::OK, Json(RegisterResponse::verified(data)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
