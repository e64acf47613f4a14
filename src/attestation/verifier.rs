// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation verification pipeline.
//!
//! 1. The attestation carries at least one signature.
//! 2. The timestamp is at most [`MAX_CLOCK_SKEW_MS`] in the future and at
//!    most [`ATTESTATION_VALIDITY_MS`] old.
//! 3. At least one signature over the commitment recovers to a trusted
//!    attestor. Other signatures are skipped and logged.
//! 4. `data` parses as JSON and satisfies the payload schema.

use alloy::primitives::Address;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::codec::{encode_attestation, CodecError};
use super::signature::{classify_signatures, TrustPolicy, MOCK_ATTESTOR};
use super::types::{Attestation, HealthData, InvoiceData};

/// Maximum attestation age (24 hours).
pub const ATTESTATION_VALIDITY_MS: i64 = 24 * 60 * 60 * 1000;

/// Tolerated clock skew for attestations stamped in the future (1 minute).
pub const MAX_CLOCK_SKEW_MS: i64 = 60 * 1000;

/// Reasons an attestation is refused.
///
/// The `Display` text is the rejection reason handed back to callers and,
/// for claims, recorded on-chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    #[error("No signatures in attestation")]
    NoSignatures,

    #[error("Attestation timestamp is in the future")]
    FutureTimestamp,

    #[error("Attestation has expired")]
    Expired,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("No valid attestor signatures found")]
    NoTrustedSignatures,

    #[error("Failed to parse attestation data")]
    MalformedData,

    #[error("Invalid health data structure")]
    InvalidHealthData,

    #[error("Health score out of valid range")]
    HealthScoreOutOfRange,

    #[error("Invalid invoice data structure")]
    InvalidInvoiceData,

    #[error("Invoice amount must be positive")]
    NonPositiveAmount,
}

/// A payload schema that attested `data` can be validated against.
pub trait AttestedPayload: DeserializeOwned {
    /// Validate the parsed JSON and build the typed payload.
    fn from_value(value: &Value) -> Result<Self, AttestationError>;
}

impl AttestedPayload for HealthData {
    fn from_value(value: &Value) -> Result<Self, AttestationError> {
        let well_formed = value.get("healthScore").is_some_and(Value::is_number)
            && value.get("bmi").is_some_and(Value::is_string)
            && value.get("bloodPressure").is_some_and(Value::is_string);
        if !well_formed {
            return Err(AttestationError::InvalidHealthData);
        }

        let data: HealthData = serde_json::from_value(value.clone())
            .map_err(|_| AttestationError::InvalidHealthData)?;

        if !(0.0..=100.0).contains(&data.health_score) {
            return Err(AttestationError::HealthScoreOutOfRange);
        }
        Ok(data)
    }
}

impl AttestedPayload for InvoiceData {
    fn from_value(value: &Value) -> Result<Self, AttestationError> {
        let well_formed = value.get("invoiceId").is_some_and(Value::is_string)
            && value.get("amount").is_some_and(Value::is_number)
            && value.get("hospitalId").is_some_and(Value::is_string);
        if !well_formed {
            return Err(AttestationError::InvalidInvoiceData);
        }

        let data: InvoiceData = serde_json::from_value(value.clone())
            .map_err(|_| AttestationError::InvalidInvoiceData)?;

        if data.amount <= 0.0 {
            return Err(AttestationError::NonPositiveAmount);
        }
        Ok(data)
    }
}

/// A verified attestation with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedAttestation<T> {
    pub recipient: String,
    pub payload: T,
    /// The parsed `data` exactly as attested.
    pub data: Value,
    pub timestamp: u64,
    /// Trusted attestors whose signatures were accepted.
    pub attestors: Vec<Address>,
}

/// Verifies attestations against a fixed [`TrustPolicy`].
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    policy: TrustPolicy,
}

impl AttestationVerifier {
    pub fn new(policy: TrustPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Verify a registration attestation about a health record.
    pub fn verify_health(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedAttestation<HealthData>, AttestationError> {
        self.verify(attestation)
    }

    /// Verify a claim attestation about a medical invoice.
    pub fn verify_invoice(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedAttestation<InvoiceData>, AttestationError> {
        self.verify(attestation)
    }

    /// Verify against the current wall clock.
    pub fn verify<T: AttestedPayload>(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedAttestation<T>, AttestationError> {
        self.verify_at(attestation, chrono::Utc::now().timestamp_millis())
    }

    /// Verify as of `now_ms` (milliseconds since the Unix epoch).
    pub fn verify_at<T: AttestedPayload>(
        &self,
        attestation: &Attestation,
        now_ms: i64,
    ) -> Result<VerifiedAttestation<T>, AttestationError> {
        tracing::debug!(
            recipient = %attestation.recipient,
            timestamp = attestation.timestamp,
            attestors = attestation.attestors.len(),
            signatures = attestation.signatures.len(),
            "Verifying attestation"
        );

        if attestation.signatures.is_empty() {
            return Err(AttestationError::NoSignatures);
        }

        check_freshness(attestation.timestamp, now_ms)?;

        let hash = encode_attestation(attestation)?;
        let report = classify_signatures(&hash, &attestation.signatures, &self.policy);

        for skipped in &report.skipped {
            tracing::warn!(
                index = skipped.index,
                issue = %skipped.issue,
                message_hash = %hash,
                "Skipping attestation signature"
            );
        }
        if report.trusted.contains(&MOCK_ATTESTOR) {
            tracing::warn!("Accepting mock attestor in development mode");
        }
        if report.trusted.is_empty() {
            return Err(AttestationError::NoTrustedSignatures);
        }

        let data: Value =
            serde_json::from_str(&attestation.data).map_err(|_| AttestationError::MalformedData)?;
        let payload = T::from_value(&data)?;

        tracing::info!(
            recipient = %attestation.recipient,
            attestors = ?report.trusted,
            "Attestation verified"
        );

        Ok(VerifiedAttestation {
            recipient: attestation.recipient.clone(),
            payload,
            data,
            timestamp: attestation.timestamp,
            attestors: report.trusted,
        })
    }
}

fn check_freshness(timestamp_ms: u64, now_ms: i64) -> Result<(), AttestationError> {
    let timestamp = i128::from(timestamp_ms);
    let now = i128::from(now_ms);

    if timestamp > now + i128::from(MAX_CLOCK_SKEW_MS) {
        return Err(AttestationError::FutureTimestamp);
    }
    if now - timestamp > i128::from(ATTESTATION_VALIDITY_MS) {
        return Err(AttestationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::types::AttNetworkRequest;
    use alloy::primitives::B256;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    const NOW: i64 = 1_760_000_000_000;

    fn attestor() -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::repeat_byte(0x21)).unwrap()
    }

    fn verifier() -> AttestationVerifier {
        AttestationVerifier::new(TrustPolicy::new([attestor().address()], false))
    }

    fn attestation(data: &str, timestamp: i64) -> Attestation {
        Attestation {
            recipient: "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12".into(),
            request: AttNetworkRequest {
                url: "https://hospital.example/records/1".into(),
                header: String::new(),
                method: "GET".into(),
                body: String::new(),
            },
            data: data.into(),
            timestamp: timestamp as u64,
            ..Default::default()
        }
    }

    fn signed_by(signer: &PrivateKeySigner, mut att: Attestation) -> Attestation {
        let hash = encode_attestation(&att).unwrap();
        let signature = signer.sign_message_sync(hash.as_slice()).unwrap();
        att.signatures.push(alloy::hex::encode_prefixed(signature.as_bytes()));
        att
    }

    const HEALTH: &str =
        r#"{"healthScore":82,"bmi":"22.5","bloodPressure":"120/80","checkupDate":"2025-01-01","hospitalId":"h1"}"#;
    const INVOICE: &str =
        r#"{"invoiceId":"inv_1","amount":1500000000,"currency":"USDC","hospitalId":"h1"}"#;

    #[test]
    fn valid_health_attestation_round_trips_data() {
        let att = signed_by(&attestor(), attestation(HEALTH, NOW));
        let verified = verifier().verify_at::<HealthData>(&att, NOW).unwrap();

        let expected: Value = serde_json::from_str(HEALTH).unwrap();
        assert_eq!(verified.data, expected);
        assert_eq!(verified.payload.health_score, 82.0);
        assert_eq!(verified.attestors, vec![attestor().address()]);
        assert_eq!(verified.timestamp, NOW as u64);
    }

    #[test]
    fn valid_invoice_attestation_is_typed() {
        let att = signed_by(&attestor(), attestation(INVOICE, NOW - 1_000));
        let verified = verifier().verify_at::<InvoiceData>(&att, NOW).unwrap();
        assert_eq!(verified.payload.invoice_id, "inv_1");
        assert_eq!(verified.payload.amount, 1_500_000_000.0);
    }

    #[test]
    fn unsigned_attestation_is_rejected() {
        let att = attestation(HEALTH, NOW);
        assert_eq!(
            verifier().verify_at::<HealthData>(&att, NOW),
            Err(AttestationError::NoSignatures)
        );
    }

    #[test]
    fn untrusted_signers_only_is_rejected() {
        let stranger = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x99)).unwrap();
        let att = signed_by(&stranger, attestation(HEALTH, NOW));
        let err = verifier().verify_at::<HealthData>(&att, NOW).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("no valid attestor"));
    }

    #[test]
    fn stale_attestation_is_expired() {
        let att = signed_by(&attestor(), attestation(HEALTH, NOW - ATTESTATION_VALIDITY_MS - 1));
        let err = verifier().verify_at::<HealthData>(&att, NOW).unwrap_err();
        assert_eq!(err, AttestationError::Expired);
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn freshness_bounds_are_inclusive() {
        let oldest = signed_by(&attestor(), attestation(HEALTH, NOW - ATTESTATION_VALIDITY_MS));
        assert!(verifier().verify_at::<HealthData>(&oldest, NOW).is_ok());

        let newest = signed_by(&attestor(), attestation(HEALTH, NOW + MAX_CLOCK_SKEW_MS));
        assert!(verifier().verify_at::<HealthData>(&newest, NOW).is_ok());
    }

    #[test]
    fn future_attestation_is_rejected() {
        let att = signed_by(&attestor(), attestation(HEALTH, NOW + MAX_CLOCK_SKEW_MS + 1));
        let err = verifier().verify_at::<HealthData>(&att, NOW).unwrap_err();
        assert_eq!(err, AttestationError::FutureTimestamp);
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn tampered_data_invalidates_signature() {
        let mut att = signed_by(&attestor(), attestation(HEALTH, NOW));
        att.data = HEALTH.replace("82", "99");
        assert_eq!(
            verifier().verify_at::<HealthData>(&att, NOW),
            Err(AttestationError::NoTrustedSignatures)
        );
    }

    #[test]
    fn one_trusted_signature_is_enough() {
        let stranger = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x99)).unwrap();
        let mut att = signed_by(&stranger, attestation(INVOICE, NOW));
        att.signatures.insert(0, "0x00".into());
        let att = signed_by(&attestor(), att);

        let verified = verifier().verify_at::<InvoiceData>(&att, NOW).unwrap();
        assert_eq!(verified.attestors, vec![attestor().address()]);
    }

    #[test]
    fn non_json_data_is_rejected() {
        let att = signed_by(&attestor(), attestation("not json", NOW));
        assert_eq!(
            verifier().verify_at::<HealthData>(&att, NOW),
            Err(AttestationError::MalformedData)
        );
    }

    #[test]
    fn health_schema_is_enforced() {
        let cases = [
            (r#"{"healthScore":"80","bmi":"22","bloodPressure":"120/80"}"#, AttestationError::InvalidHealthData),
            (r#"{"healthScore":80,"bloodPressure":"120/80"}"#, AttestationError::InvalidHealthData),
            (r#"{"healthScore":101,"bmi":"22","bloodPressure":"120/80"}"#, AttestationError::HealthScoreOutOfRange),
            (r#"{"healthScore":-1,"bmi":"22","bloodPressure":"120/80"}"#, AttestationError::HealthScoreOutOfRange),
        ];
        for (data, expected) in cases {
            let att = signed_by(&attestor(), attestation(data, NOW));
            assert_eq!(verifier().verify_at::<HealthData>(&att, NOW), Err(expected));
        }
    }

    #[test]
    fn invoice_schema_is_enforced() {
        let cases = [
            (r#"{"invoiceId":1,"amount":10,"hospitalId":"h1"}"#, AttestationError::InvalidInvoiceData),
            (r#"{"invoiceId":"inv","amount":"10","hospitalId":"h1"}"#, AttestationError::InvalidInvoiceData),
            (r#"{"invoiceId":"inv","amount":0,"hospitalId":"h1"}"#, AttestationError::NonPositiveAmount),
            (r#"{"invoiceId":"inv","amount":-5,"hospitalId":"h1"}"#, AttestationError::NonPositiveAmount),
        ];
        for (data, expected) in cases {
            let att = signed_by(&attestor(), attestation(data, NOW));
            assert_eq!(verifier().verify_at::<InvoiceData>(&att, NOW), Err(expected));
        }
    }

    #[test]
    fn optional_fields_do_not_affect_validity() {
        let invoices = [
            r#"{"invoiceId":"inv_1","amount":1500000000,"hospitalId":"h1","patientRef":null}"#,
            r#"{"invoiceId":"inv_1","amount":1500000000,"hospitalId":"h1","currency":6}"#,
            r#"{"invoiceId":"inv_1","amount":1500000000,"hospitalId":"h1","invoiceDate":{"y":2025}}"#,
        ];
        for data in invoices {
            let att = signed_by(&attestor(), attestation(data, NOW));
            let verified = verifier().verify_at::<InvoiceData>(&att, NOW).unwrap();
            assert_eq!(verified.data, serde_json::from_str::<Value>(data).unwrap());
        }

        let health = r#"{"healthScore":82,"bmi":"22.5","bloodPressure":"120/80","checkupDate":null,"hospitalId":12}"#;
        let att = signed_by(&attestor(), attestation(health, NOW));
        let verified = verifier().verify_at::<HealthData>(&att, NOW).unwrap();
        assert_eq!(verified.payload.hospital_id, None);
    }

    #[test]
    fn mock_attestor_signature_cannot_be_forged_but_policy_flag_is_honoured() {
        let demo = AttestationVerifier::new(TrustPolicy::new(Vec::<Address>::new(), true));
        assert!(demo.policy().allows_mock());
        let att = signed_by(&attestor(), attestation(HEALTH, NOW));
        assert_eq!(
            demo.verify_at::<HealthData>(&att, NOW),
            Err(AttestationError::NoTrustedSignatures)
        );
    }
}
