// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation commitment encoding.
//!
//! Attestors sign a single keccak256 commitment over the semantic fields of
//! an attestation. The encoding mirrors Solidity's `abi.encodePacked` so any
//! verifier (on-chain or off-chain) can reproduce it bit for bit:
//!
//! ```text
//! requestHash  = keccak256(packed(url, header, method, body))
//! responseHash = fold(resolvers, |acc, r| keccak256(acc ‖ packed(keyName, parseType, parsePath)))
//! commitment   = keccak256(packed(recipient, requestHash, responseHash, data,
//!                                 attConditions, uint256(timestamp), additionParams))
//! ```
//!
//! The resolver fold is order-sensitive. An empty resolver list encodes to
//! the zero hash.

use std::str::FromStr;

use alloy::{
    primitives::{keccak256, Address, B256, U256},
    sol_types::SolValue,
};

use super::types::{AttNetworkRequest, AttNetworkResponseResolve, Attestation};

/// Errors raised for attestations whose fields cannot be packed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
}

/// Hash of the packed request tuple `(url, header, method, body)`.
pub fn encode_request(request: &AttNetworkRequest) -> B256 {
    let packed = (
        request.url.clone(),
        request.header.clone(),
        request.method.clone(),
        request.body.clone(),
    )
        .abi_encode_packed();
    keccak256(packed)
}

/// Running hash over the response resolvers, in order.
pub fn encode_response_resolve(resolves: &[AttNetworkResponseResolve]) -> B256 {
    let mut combined: Vec<u8> = Vec::new();

    for resolve in resolves {
        let packed = (
            resolve.key_name.clone(),
            resolve.parse_type.clone(),
            resolve.parse_path.clone(),
        )
            .abi_encode_packed();
        combined.extend_from_slice(&packed);
        combined = keccak256(&combined).to_vec();
    }

    if combined.is_empty() {
        B256::ZERO
    } else {
        B256::from_slice(&combined)
    }
}

/// The signable commitment of an attestation.
pub fn encode_attestation(attestation: &Attestation) -> Result<B256, CodecError> {
    let recipient = Address::from_str(attestation.recipient.trim())
        .map_err(|_| CodecError::InvalidRecipient(attestation.recipient.clone()))?;

    let packed = (
        recipient,
        encode_request(&attestation.request),
        encode_response_resolve(&attestation.response_resolve),
        attestation.data.clone(),
        attestation.att_conditions.clone(),
        U256::from(attestation.timestamp),
        attestation.addition_params.clone(),
    )
        .abi_encode_packed();

    Ok(keccak256(packed))
}
