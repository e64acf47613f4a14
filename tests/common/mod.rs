// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: an in-memory ledger and a router wired around it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, B256, U256};
use alloy::signers::{local::PrivateKeySigner, SignerSync};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use curance_oracle::{
    api::router,
    attestation::{encode_attestation, AttNetworkRequest, Attestation, AttestationVerifier, TrustPolicy},
    chain::{ChainError, Claim, ClaimStatus, InsuranceLedger, Policy},
    ownership::OwnershipProver,
    state::{AppState, ContractAddresses},
    storage::OracleDatabase,
};

pub const ENABLE_TX: TxHash = TxHash::repeat_byte(0xe1);
pub const REJECT_TX: TxHash = TxHash::repeat_byte(0xd1);

/// Records every write so tests can assert on call counts.
#[derive(Default)]
pub struct MockLedger {
    pub claims: Mutex<HashMap<B256, Claim>>,
    pub policies: Mutex<HashMap<B256, (Policy, bool)>>,
    pub enabled: Mutex<Vec<B256>>,
    pub rejected: Mutex<Vec<(B256, String)>>,
}

impl MockLedger {
    pub fn with_claim(self, claim_id: B256, claim: Claim) -> Self {
        self.claims.lock().unwrap().insert(claim_id, claim);
        self
    }

    pub fn with_policy(self, commitment: B256, policy: Policy, valid: bool) -> Self {
        self.policies
            .lock()
            .unwrap()
            .insert(commitment, (policy, valid));
        self
    }

    pub fn enable_calls(&self) -> Vec<B256> {
        self.enabled.lock().unwrap().clone()
    }

    pub fn reject_calls(&self) -> Vec<(B256, String)> {
        self.rejected.lock().unwrap().clone()
    }

    fn set_status(&self, claim_id: B256, status: ClaimStatus) {
        if let Some(claim) = self.claims.lock().unwrap().get_mut(&claim_id) {
            claim.status = status;
        }
    }
}

#[async_trait]
impl InsuranceLedger for MockLedger {
    async fn get_claim(&self, claim_id: B256) -> Result<Option<Claim>, ChainError> {
        Ok(self.claims.lock().unwrap().get(&claim_id).cloned())
    }

    async fn get_claim_status(&self, claim_id: B256) -> Result<ClaimStatus, ChainError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .get(&claim_id)
            .map(|c| c.status)
            .unwrap_or(ClaimStatus::None))
    }

    async fn is_policy_valid(&self, commitment: B256) -> Result<bool, ChainError> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .get(&commitment)
            .is_some_and(|(_, valid)| *valid))
    }

    async fn get_policy(&self, commitment: B256) -> Result<Option<Policy>, ChainError> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .get(&commitment)
            .map(|(policy, _)| policy.clone()))
    }

    async fn enable_claim(&self, claim_id: B256) -> Result<TxHash, ChainError> {
        self.enabled.lock().unwrap().push(claim_id);
        self.set_status(claim_id, ClaimStatus::Enabled);
        Ok(ENABLE_TX)
    }

    async fn reject_claim(&self, claim_id: B256, reason: &str) -> Result<TxHash, ChainError> {
        self.rejected
            .lock()
            .unwrap()
            .push((claim_id, reason.to_string()));
        self.set_status(claim_id, ClaimStatus::Rejected);
        Ok(REJECT_TX)
    }
}

pub fn claim_id() -> B256 {
    B256::repeat_byte(0xaa)
}

pub fn policy_commitment() -> B256 {
    B256::repeat_byte(0xcc)
}

pub fn invoice_hash() -> B256 {
    B256::repeat_byte(0xee)
}

pub fn attestor() -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(0x42)).unwrap()
}

pub fn pending_claim() -> Claim {
    Claim {
        policy_commitment: policy_commitment(),
        hospital: Address::repeat_byte(0x11),
        amount: U256::from(1_500_000_000u64),
        invoice_hash: invoice_hash(),
        status: ClaimStatus::Pending,
        created_at: 1_735_689_600,
        updated_at: 1_735_689_600,
    }
}

pub fn active_policy() -> Policy {
    Policy {
        premium: U256::from(100_000_000u64),
        coverage_amount: U256::from(10_000_000_000u64),
        used_coverage: U256::ZERO,
        start_time: 1_735_689_600,
        expiry_time: 1_767_225_600,
        is_active: true,
    }
}

/// A pending claim against a valid policy.
pub fn standard_ledger() -> MockLedger {
    MockLedger::default()
        .with_claim(claim_id(), pending_claim())
        .with_policy(policy_commitment(), active_policy(), true)
}

/// Sign `data` as an attestation from `signer`, timestamped now.
pub fn signed_attestation(signer: &PrivateKeySigner, url: &str, data: &str) -> Attestation {
    let mut att = Attestation {
        recipient: "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12".into(),
        request: AttNetworkRequest {
            url: url.into(),
            method: "GET".into(),
            ..Default::default()
        },
        data: data.into(),
        timestamp: chrono::Utc::now().timestamp_millis() as u64,
        ..Default::default()
    };
    let hash = encode_attestation(&att).unwrap();
    let signature = signer.sign_message_sync(hash.as_slice()).unwrap();
    att.signatures
        .push(alloy::hex::encode_prefixed(signature.as_bytes()));
    att
}

pub const INVOICE_DATA: &str = r#"{"invoiceId":"inv_1","amount":1500000000,"currency":"USDC","hospitalId":"h1","treatmentType":"outpatient"}"#;
pub const HEALTH_DATA: &str = r#"{"healthScore":82,"bmi":"22.5","bloodPressure":"120/80","checkupDate":"2025-01-01","hospitalId":"h1"}"#;

pub struct TestApp {
    pub router: Router,
    pub ledger: Arc<MockLedger>,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(ledger: MockLedger, strict_ownership: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let db = OracleDatabase::open(&dir.path().join("oracle.redb")).unwrap();
        let ledger = Arc::new(ledger);
        let state = AppState::new(
            ledger.clone(),
            AttestationVerifier::new(TrustPolicy::new([attestor().address()], false)),
            OwnershipProver::new(strict_ownership),
            db,
            ContractAddresses {
                registry: Address::repeat_byte(0x01),
                claims: Address::repeat_byte(0x02),
            },
        );
        Self {
            router: router(state, &["http://localhost:3000".to_string()]),
            ledger,
            _dir: dir,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
