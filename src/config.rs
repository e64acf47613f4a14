// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Missing
//! required values and malformed values are startup errors.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PRIVATE_KEY` | Oracle account key (hex, optional `0x`) | Required |
//! | `RPC_URL` | JSON-RPC endpoint | Required |
//! | `REGISTRY_ADDRESS` | Policy registry contract | Required |
//! | `CLAIMS_ADDRESS` | Claims contract | Required |
//! | `TRUSTED_ATTESTORS` | Comma-separated attestor addresses | empty |
//! | `NODE_ENV` | `production` disables the mock attestor | `development` |
//! | `STRICT_OWNERSHIP` | Require recomputed ownership commitments | `true` in production |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `DATA_DIR` | Directory of the oracle database | `./data` |
//! | `CORS_ORIGINS` | Comma-separated allowed origins | `http://localhost:3000` |
//! | `RPC_TIMEOUT_SECS` | Timeout for each contract read | `30` |
//! | `RECEIPT_TIMEOUT_SECS` | Timeout for each write until its receipt | `120` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::attestation::TrustPolicy;
use crate::chain::ContractSettings;
use crate::storage::DATABASE_FILE;

pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const REGISTRY_ADDRESS_ENV: &str = "REGISTRY_ADDRESS";
pub const CLAIMS_ADDRESS_ENV: &str = "CLAIMS_ADDRESS";
pub const TRUSTED_ATTESTORS_ENV: &str = "TRUSTED_ATTESTORS";
pub const NODE_ENV_ENV: &str = "NODE_ENV";
pub const STRICT_OWNERSHIP_ENV: &str = "STRICT_OWNERSHIP";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the oracle database directory.
///
/// # Default
/// `./data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT_SECS";
pub const RECEIPT_TIMEOUT_ENV: &str = "RECEIPT_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl fmt::Display) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

/// Deployment mode, from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => RuntimeMode::Production,
            _ => RuntimeMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeMode::Development => "development",
            RuntimeMode::Production => "production",
        }
    }
}

/// Log output format, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::from_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// The oracle's signing key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// PEM certificate chain and key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub private_key: PrivateKey,
    pub rpc_url: url::Url,
    pub registry_address: Address,
    pub claims_address: Address,
    pub trusted_attestors: Vec<Address>,
    pub mode: RuntimeMode,
    pub strict_ownership: bool,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub rpc_timeout: Duration,
    pub receipt_timeout: Duration,
    pub tls: Option<TlsPaths>,
}

impl OracleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let private_key = PrivateKey::new(require(PRIVATE_KEY_ENV)?);
        let rpc_url = url::Url::parse(&require(RPC_URL_ENV)?)
            .map_err(|e| ConfigError::invalid(RPC_URL_ENV, e))?;
        let registry_address = parse_address(REGISTRY_ADDRESS_ENV, &require(REGISTRY_ADDRESS_ENV)?)?;
        let claims_address = parse_address(CLAIMS_ADDRESS_ENV, &require(CLAIMS_ADDRESS_ENV)?)?;

        let trusted_attestors = match get(TRUSTED_ATTESTORS_ENV) {
            Some(list) => split_list(&list)
                .map(|entry| parse_address(TRUSTED_ATTESTORS_ENV, entry))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let mode = RuntimeMode::from_node_env(get(NODE_ENV_ENV).as_deref());
        let strict_ownership = match get(STRICT_OWNERSHIP_ENV) {
            Some(value) => parse_bool(STRICT_OWNERSHIP_ENV, &value)?,
            None => mode.is_production(),
        };

        let port = match get(PORT_ENV) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = split_list(
            &get(CORS_ORIGINS_ENV).unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )
        .map(str::to_string)
        .collect();

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            private_key,
            rpc_url,
            registry_address,
            claims_address,
            trusted_attestors,
            mode,
            strict_ownership,
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: get(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            cors_origins,
            rpc_timeout: parse_secs(RPC_TIMEOUT_ENV, get(RPC_TIMEOUT_ENV), DEFAULT_RPC_TIMEOUT_SECS)?,
            receipt_timeout: parse_secs(
                RECEIPT_TIMEOUT_ENV,
                get(RECEIPT_TIMEOUT_ENV),
                DEFAULT_RECEIPT_TIMEOUT_SECS,
            )?,
            tls,
        })
    }

    /// Trusted attestors, with the mock attestor allowed outside production.
    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy::new(
            self.trusted_attestors.iter().copied(),
            !self.mode.is_production(),
        )
    }

    pub fn contract_settings(&self) -> ContractSettings {
        ContractSettings {
            rpc_url: self.rpc_url.clone(),
            registry: self.registry_address,
            claims: self.claims_address,
            read_timeout: self.rpc_timeout,
            write_timeout: self.receipt_timeout,
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|e| ConfigError::invalid(var, format!("{value}: {e}")))
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(var, format!("expected a boolean, got {other}"))),
    }
}

fn parse_secs(
    var: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(v) => v.parse::<u64>().map_err(|e| ConfigError::invalid(var, e))?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::invalid(var, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
