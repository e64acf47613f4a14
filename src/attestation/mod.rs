// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! zkTLS attestation handling.
//!
//! This module provides:
//! - The attestation wire format and its health/invoice payloads
//! - Deterministic commitment encoding (what attestors sign)
//! - Signer recovery against a configured trusted-attestor set
//! - The full verification pipeline producing typed payloads

pub mod codec;
pub mod signature;
pub mod types;
pub mod verifier;

pub use codec::{encode_attestation, CodecError};
pub use signature::{TrustPolicy, MOCK_ATTESTOR};
pub use types::*;
pub use verifier::{AttestationError, AttestationVerifier, VerifiedAttestation};
