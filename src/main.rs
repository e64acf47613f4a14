// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::EnvFilter;

use curance_oracle::{
    api::router,
    attestation::AttestationVerifier,
    chain::CuranceContracts,
    config::{LogFormat, OracleConfig, DEFAULT_LOG_FILTER},
    ownership::OwnershipProver,
    state::{AppState, ContractAddresses},
    storage::OracleDatabase,
};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(LogFormat::from_env());

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Oracle failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = OracleConfig::from_env()?;
    let addr = config.bind_addr()?;

    let contracts = CuranceContracts::connect(
        config.contract_settings(),
        config.private_key.expose(),
    )?;

    let trust_policy = config.trust_policy();
    if trust_policy.trusted_count() == 0 {
        if config.mode.is_production() {
            tracing::warn!("No trusted attestors configured, every attestation will be refused");
        } else {
            tracing::warn!("No trusted attestors configured, only the mock attestor is accepted");
        }
    }

    tracing::info!(
        oracle = %contracts.oracle_address(),
        registry = %config.registry_address,
        claims = %config.claims_address,
        mode = config.mode.as_str(),
        trusted_attestors = trust_policy.trusted_count(),
        mock_attestor = trust_policy.allows_mock(),
        strict_ownership = config.strict_ownership,
        "Oracle configured"
    );

    let db = OracleDatabase::open(&config.database_path())?;
    tracing::info!(path = %config.database_path().display(), "Oracle database opened");

    let state = AppState::new(
        Arc::new(contracts),
        AttestationVerifier::new(trust_policy),
        OwnershipProver::new(config.strict_ownership),
        db,
        ContractAddresses {
            registry: config.registry_address,
            claims: config.claims_address,
        },
    );
    let app = router(state, &config.cors_origins);

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls before loading certificates
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!("Curance oracle listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("Curance oracle listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_on_signal(handle: Handle<std::net::SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
