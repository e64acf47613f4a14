// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestor signature recovery and trust classification.
//!
//! Attestors sign the 32-byte attestation commitment as an EIP-191
//! personal message. Recovery works per signature: a bad signature is
//! reported and skipped, it never aborts the evaluation of the others.

use std::collections::HashSet;

use alloy::primitives::{address, Address, Signature, B256};

/// Well-known attestor address used by local demo attestations.
pub const MOCK_ATTESTOR: Address = address!("0000000000000000000000000000000000000001");

/// Length of a hex-encoded 65-byte signature including the `0x` prefix.
const SIGNATURE_HEX_LEN: usize = 132;

/// Set of attestors whose signatures are accepted.
///
/// Built once at startup from configuration. The mock attestor is only
/// honoured when `allow_mock` is set, which must never be the case in
/// production.
#[derive(Debug, Clone, Default)]
pub struct TrustPolicy {
    trusted: HashSet<Address>,
    allow_mock: bool,
}

impl TrustPolicy {
    pub fn new(trusted: impl IntoIterator<Item = Address>, allow_mock: bool) -> Self {
        Self {
            trusted: trusted.into_iter().collect(),
            allow_mock,
        }
    }

    /// Whether `address` may vouch for an attestation.
    ///
    /// `Address` equality is byte equality, so checksum casing of the
    /// configured or recovered value is irrelevant.
    pub fn is_trusted(&self, address: &Address) -> bool {
        self.trusted.contains(address) || (self.allow_mock && *address == MOCK_ATTESTOR)
    }

    pub fn allows_mock(&self) -> bool {
        self.allow_mock
    }

    pub fn trusted_count(&self) -> usize {
        self.trusted.len()
    }
}

/// Why a single signature did not count towards an attestation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureIssue {
    #[error("invalid signature length {0} (expected 132 hex characters)")]
    InvalidLength(usize),

    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("signer could not be recovered: {0}")]
    Unrecoverable(String),

    #[error("signer {0} is not a trusted attestor")]
    Untrusted(Address),

    #[error("signer {0} already counted")]
    DuplicateSigner(Address),
}

/// A signature that was skipped, with its position in the attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSignature {
    pub index: usize,
    pub issue: SignatureIssue,
}

/// Outcome of classifying every signature of an attestation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureReport {
    /// Distinct trusted signers, in signature order.
    pub trusted: Vec<Address>,
    pub skipped: Vec<SkippedSignature>,
}

/// Recover the address that signed `hash` as an EIP-191 message.
pub fn recover_signer(hash: &B256, signature: &str) -> Result<Address, SignatureIssue> {
    let signature = signature.trim();
    if signature.len() != SIGNATURE_HEX_LEN || !signature.starts_with("0x") {
        return Err(SignatureIssue::InvalidLength(signature.len()));
    }

    let bytes = alloy::hex::decode(&signature[2..]).map_err(|_| SignatureIssue::InvalidHex)?;
    let parsed = Signature::from_raw(&bytes)
        .map_err(|e| SignatureIssue::Unrecoverable(e.to_string()))?;

    parsed
        .recover_address_from_msg(hash.as_slice())
        .map_err(|e| SignatureIssue::Unrecoverable(e.to_string()))
}

/// Classify every signature over `hash` against `policy`.
pub fn classify_signatures(
    hash: &B256,
    signatures: &[String],
    policy: &TrustPolicy,
) -> SignatureReport {
    let mut report = SignatureReport::default();

    for (index, signature) in signatures.iter().enumerate() {
        let issue = match recover_signer(hash, signature) {
            Ok(signer) if !policy.is_trusted(&signer) => SignatureIssue::Untrusted(signer),
            Ok(signer) if report.trusted.contains(&signer) => {
                SignatureIssue::DuplicateSigner(signer)
            }
            Ok(signer) => {
                report.trusted.push(signer);
                continue;
            }
            Err(issue) => issue,
        };
        report.skipped.push(SkippedSignature { index, issue });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    fn test_signer(seed: u8) -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::repeat_byte(seed)).unwrap()
    }

    fn sign(signer: &PrivateKeySigner, hash: &B256) -> String {
        let signature = signer.sign_message_sync(hash.as_slice()).unwrap();
        alloy::hex::encode_prefixed(signature.as_bytes())
    }

    #[test]
    fn recovers_eip191_signer() {
        let signer = test_signer(1);
        let hash = B256::repeat_byte(0x42);

        let recovered = recover_signer(&hash, &sign(&signer, &hash)).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn rejects_wrong_length() {
        let hash = B256::repeat_byte(0x42);
        assert_eq!(
            recover_signer(&hash, "0x1234"),
            Err(SignatureIssue::InvalidLength(6))
        );
    }

    #[test]
    fn rejects_non_hex() {
        let hash = B256::repeat_byte(0x42);
        let bogus = format!("0x{}", "zz".repeat(65));
        assert_eq!(recover_signer(&hash, &bogus), Err(SignatureIssue::InvalidHex));
    }

    #[test]
    fn trust_policy_mock_bypass_is_opt_in() {
        let strict = TrustPolicy::new(Vec::<Address>::new(), false);
        let demo = TrustPolicy::new(Vec::<Address>::new(), true);

        assert!(!strict.is_trusted(&MOCK_ATTESTOR));
        assert!(demo.is_trusted(&MOCK_ATTESTOR));
    }

    #[test]
    fn trust_policy_matches_configured_addresses() {
        let attestor = test_signer(2).address();
        let policy = TrustPolicy::new([attestor], false);

        assert!(policy.is_trusted(&attestor));
        assert!(!policy.is_trusted(&Address::repeat_byte(0x11)));
        assert_eq!(policy.trusted_count(), 1);
    }

    #[test]
    fn classification_keeps_trusted_and_reports_the_rest() {
        let trusted = test_signer(3);
        let stranger = test_signer(4);
        let policy = TrustPolicy::new([trusted.address()], false);
        let hash = B256::repeat_byte(0x07);

        let signatures = vec![
            "0xdead".to_string(),
            sign(&stranger, &hash),
            sign(&trusted, &hash),
            sign(&trusted, &hash),
        ];
        let report = classify_signatures(&hash, &signatures, &policy);

        assert_eq!(report.trusted, vec![trusted.address()]);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.skipped[0].index, 0);
        assert_eq!(
            report.skipped[1].issue,
            SignatureIssue::Untrusted(stranger.address())
        );
        assert_eq!(
            report.skipped[2].issue,
            SignatureIssue::DuplicateSigner(trusted.address())
        );
    }

    #[test]
    fn signature_over_other_hash_does_not_recover_trusted_signer() {
        let trusted = test_signer(5);
        let policy = TrustPolicy::new([trusted.address()], false);
        let signed = B256::repeat_byte(0x01);
        let checked = B256::repeat_byte(0x02);

        let report = classify_signatures(&checked, &[sign(&trusted, &signed)], &policy);
        assert!(report.trusted.is_empty());
    }
}
