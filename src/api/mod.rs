// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    attestation::{AttNetworkRequest, AttNetworkResponseResolve, Attestation, Attestor},
    chain::ClaimStatus,
    legacy::{HealthProof, InvoiceProof},
    models::{
        ClaimResponse, ClaimStatusResponse, ContractsInfo, HealthResponse, PolicyResponse,
        RegisterRequest, RegisterResponse, RegistrationData, RootResponse, VerifyClaimRequest,
        VerifyClaimResponse,
    },
    ownership::OwnershipProof,
    state::AppState,
};

pub mod claims;
pub mod health;
pub mod policies;
pub mod register;

/// Build the HTTP router.
///
/// `cors_origins` lists the browser origins allowed to call the API; entries
/// that are not valid header values are skipped.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/register", post(register::register))
        .route("/claims/verify", post(claims::verify_claim))
        .route("/claims/{claim_id}", get(claims::get_claim))
        .route("/claims/{claim_id}/status", get(claims::get_claim_status))
        .route("/policies/{commitment}", get(policies::get_policy));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins = origins
        .iter()
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        register::register,
        claims::verify_claim,
        claims::get_claim,
        claims::get_claim_status,
        policies::get_policy
    ),
    components(
        schemas(
            Attestation,
            AttNetworkRequest,
            AttNetworkResponseResolve,
            Attestor,
            HealthProof,
            InvoiceProof,
            OwnershipProof,
            ClaimStatus,
            RegisterRequest,
            RegisterResponse,
            RegistrationData,
            VerifyClaimRequest,
            VerifyClaimResponse,
            ClaimResponse,
            ClaimStatusResponse,
            PolicyResponse,
            RootResponse,
            HealthResponse,
            ContractsInfo
        )
    ),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Registration", description = "Health evidence verification for policy registration"),
        (name = "Claims", description = "Claim verification and settlement"),
        (name = "Policies", description = "Policy lookups")
    )
)]
struct ApiDoc;
