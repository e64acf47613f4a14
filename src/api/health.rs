// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::models::{now_iso, ContractsInfo, HealthResponse, RootResponse};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "curance-oracle";

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: SERVICE_NAME.to_string(),
        status: "ok".to_string(),
        timestamp: now_iso(),
    })
}

/// Health check endpoint handler.
///
/// Reports the contract addresses the oracle is configured against. Does not
/// contact the RPC endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME.to_string(),
        status: "healthy".to_string(),
        timestamp: now_iso(),
        contracts: ContractsInfo {
            registry: state.contracts.registry.to_checksum(None),
            claims: state.contracts.claims.to_checksum(None),
        },
    })
}
