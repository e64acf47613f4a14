// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation wire types and the payloads they carry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// The observed network request an attestation speaks about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttNetworkRequest {
    pub url: String,
    #[serde(default)]
    pub header: String,
    pub method: String,
    #[serde(default)]
    pub body: String,
}

/// One field extracted from the observed response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttNetworkResponseResolve {
    pub key_name: String,
    pub parse_type: String,
    pub parse_path: String,
}

/// An attestor that was asked to attest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attestor {
    #[serde(alias = "address")]
    pub attestor_addr: String,
    #[serde(default)]
    pub url: String,
}

/// A signed zkTLS attestation.
///
/// `data` is the JSON-encoded payload extracted by the attestors; its
/// semantic content is either [`HealthData`] or [`InvoiceData`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// Address the attestation is bound to (the claimant).
    pub recipient: String,
    pub request: AttNetworkRequest,
    #[serde(default)]
    pub response_resolve: Vec<AttNetworkResponseResolve>,
    pub data: String,
    #[serde(default)]
    pub att_conditions: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default)]
    pub addition_params: String,
    #[serde(default)]
    pub attestors: Vec<Attestor>,
    /// Hex-encoded 65-byte signatures over the attestation commitment.
    #[serde(default)]
    pub signatures: Vec<String>,
}

/// Health record facts attested at registration time.
///
/// Only `healthScore`, `bmi` and `bloodPressure` are required. Descriptive
/// fields that are absent, `null` or not strings read as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// Score in `[0, 100]`.
    pub health_score: f64,
    pub bmi: String,
    pub blood_pressure: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub checkup_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
}

/// Medical invoice facts attested at claim time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub invoice_id: String,
    /// Amount in the token's smallest unit. Always positive.
    pub amount: f64,
    pub hospital_id: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub hospital_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub patient_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}
