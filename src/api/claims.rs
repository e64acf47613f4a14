// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::str::FromStr;

use alloy::primitives::B256;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::chain::ClaimStatus;
use crate::claims::{ClaimOutcome, ClaimRequest, InvoiceEvidence};
use crate::error::ApiError;
use crate::models::{ClaimResponse, ClaimStatusResponse, VerifyClaimRequest, VerifyClaimResponse};
use crate::state::AppState;

const INVALID_REQUEST: &str = "INVALID_REQUEST";

type VerifyReply = (StatusCode, Json<VerifyClaimResponse>);

fn invalid(claim_id: Option<String>, error: impl Into<String>) -> VerifyReply {
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyClaimResponse::failure(claim_id, INVALID_REQUEST, error)),
    )
}

fn parse_claim_id(claim_id: &str) -> Result<B256, ApiError> {
    B256::from_str(claim_id.trim())
        .map_err(|_| ApiError::malformed_hash("claimId"))
}

/// Verify invoice and ownership proofs, then enable or reject the claim.
///
/// Verification failures reject the claim on-chain and return the
/// `rejectClaim` transaction hash.
#[utoipa::path(
    post,
    path = "/api/claims/verify",
    tag = "Claims",
    request_body = VerifyClaimRequest,
    responses(
        (status = 200, description = "Claim enabled", body = VerifyClaimResponse),
        (status = 400, description = "Invalid request, claim not pending, or claim rejected", body = VerifyClaimResponse),
        (status = 404, description = "Claim not found", body = VerifyClaimResponse),
        (status = 500, description = "Contract or storage failure", body = VerifyClaimResponse)
    )
)]
pub async fn verify_claim(
    State(state): State<AppState>,
    payload: Result<Json<VerifyClaimRequest>, JsonRejection>,
) -> VerifyReply {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return invalid(None, format!("Invalid request body: {}", rejection.body_text()))
        }
    };

    let raw_claim_id = request.claim_id.filter(|id| !id.trim().is_empty());
    let (Some(raw_id), Some(ownership)) = (raw_claim_id.clone(), request.ownership_proof) else {
        return invalid(
            raw_claim_id,
            "Missing required fields: claimId, ownershipProof",
        );
    };

    let Ok(claim_id) = B256::from_str(raw_id.trim()) else {
        return invalid(Some(raw_id), "claimId must be a 32-byte hex value");
    };

    let has_attestation = request.invoice_attestation.is_some();
    let has_legacy_proof = request.invoice_proof.is_some();
    let Some(invoice) =
        InvoiceEvidence::from_parts(request.invoice_attestation, request.invoice_proof)
    else {
        let error = if has_attestation && has_legacy_proof {
            "Provide either invoiceAttestation or invoiceProof, not both"
        } else {
            "Missing invoice proof: provide either invoiceAttestation or invoiceProof (legacy)"
        };
        return invalid(Some(raw_id), error);
    };

    tracing::info!(
        claim_id = %claim_id,
        evidence = invoice.kind(),
        ownership_commitment = %ownership.commitment,
        "Claim verification request received"
    );

    let claim_request = ClaimRequest {
        claim_id,
        invoice,
        ownership,
    };

    let claim_id = Some(raw_id);
    match state.authorizer.authorize(&claim_request).await {
        Ok(ClaimOutcome::Enabled {
            status,
            tx_hash,
            invoice_data,
        }) => {
            tracing::info!(claim_id = ?claim_id, tx_hash = %tx_hash, "Claim enabled");
            (
                StatusCode::OK,
                Json(VerifyClaimResponse {
                    success: true,
                    claim_id,
                    status: status.name().to_string(),
                    transaction_hash: Some(tx_hash.to_string()),
                    error: None,
                    invoice_data,
                }),
            )
        }
        Ok(ClaimOutcome::Rejected { reason, tx_hash }) => (
            StatusCode::BAD_REQUEST,
            Json(VerifyClaimResponse {
                success: false,
                claim_id,
                status: ClaimStatus::Rejected.name().to_string(),
                transaction_hash: Some(tx_hash.to_string()),
                error: Some(reason),
                invoice_data: None,
            }),
        ),
        Ok(ClaimOutcome::NotPending(status)) => (
            StatusCode::BAD_REQUEST,
            Json(VerifyClaimResponse::failure(
                claim_id,
                status.name(),
                format!("Claim is not pending (current status: {status})"),
            )),
        ),
        Ok(ClaimOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(VerifyClaimResponse::failure(
                claim_id,
                "NOT_FOUND",
                "Claim not found",
            )),
        ),
        Err(e) => {
            tracing::error!(claim_id = ?claim_id, error = %e, "Claim verification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyClaimResponse::failure(claim_id, "ERROR", e.to_string())),
            )
        }
    }
}

/// Get the full claim record.
#[utoipa::path(
    get,
    path = "/api/claims/{claim_id}",
    tag = "Claims",
    params(
        ("claim_id" = String, Path, description = "Claim id (32-byte hex)")
    ),
    responses(
        (status = 200, description = "Claim record", body = ClaimResponse),
        (status = 400, description = "Malformed claim id"),
        (status = 404, description = "Claim not found"),
        (status = 500, description = "Contract failure")
    )
)]
pub async fn get_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = parse_claim_id(&claim_id)?;
    let claim = state
        .ledger
        .get_claim(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Claim not found"))?;

    Ok(Json(ClaimResponse::new(claim_id, &claim)))
}

/// Get only the claim status.
#[utoipa::path(
    get,
    path = "/api/claims/{claim_id}/status",
    tag = "Claims",
    params(
        ("claim_id" = String, Path, description = "Claim id (32-byte hex)")
    ),
    responses(
        (status = 200, description = "Claim status", body = ClaimStatusResponse),
        (status = 400, description = "Malformed claim id"),
        (status = 500, description = "Contract failure")
    )
)]
pub async fn get_claim_status(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimStatusResponse>, ApiError> {
    let id = parse_claim_id(&claim_id)?;
    let status = state.ledger.get_claim_status(id).await?;

    Ok(Json(ClaimStatusResponse {
        claim_id,
        status,
        status_code: status.code(),
    }))
}
