// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error responses for the read endpoints.
//!
//! Every error body is `{"error": "<message>"}`. Contract and storage
//! failures are logged here and surface as 500s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::chain::ChainError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }

    /// A path parameter that should be a 32-byte hex value is not one.
    pub fn malformed_hash(field: &str) -> Self {
        Self::with_status(
            StatusCode::BAD_REQUEST,
            format!("{field} must be a 32-byte hex value"),
        )
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        tracing::error!(error = %err, "Contract call failed");
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Oracle database failure");
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Oracle database unavailable")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
