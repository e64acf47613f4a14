// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::str::FromStr;

use alloy::primitives::B256;
use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiError;
use crate::models::PolicyResponse;
use crate::state::AppState;

/// Get a policy with its validity and remaining coverage.
#[utoipa::path(
    get,
    path = "/api/policies/{commitment}",
    tag = "Policies",
    params(
        ("commitment" = String, Path, description = "Policy commitment (32-byte hex)")
    ),
    responses(
        (status = 200, description = "Policy record", body = PolicyResponse),
        (status = 400, description = "Malformed commitment"),
        (status = 404, description = "Policy not found"),
        (status = 500, description = "Contract or storage failure")
    )
)]
pub async fn get_policy(
    State(state): State<AppState>,
    Path(commitment): Path<String>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let key = B256::from_str(commitment.trim())
        .map_err(|_| ApiError::malformed_hash("commitment"))?;

    let policy = state
        .ledger
        .get_policy(key)
        .await?
        .ok_or_else(|| ApiError::not_found("Policy not found"))?;
    let is_valid = state.ledger.is_policy_valid(key).await?;
    let registered = state.db.get_registration(&key)?.is_some();

    Ok(Json(PolicyResponse::new(
        commitment,
        &policy,
        is_valid,
        registered,
    )))
}
