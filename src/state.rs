// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use alloy::primitives::Address;

use crate::attestation::AttestationVerifier;
use crate::chain::InsuranceLedger;
use crate::claims::ClaimAuthorizer;
use crate::ownership::OwnershipProver;
use crate::storage::OracleDatabase;

/// Contract addresses reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub registry: Address,
    pub claims: Address,
}

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn InsuranceLedger>,
    pub verifier: Arc<AttestationVerifier>,
    pub db: Arc<OracleDatabase>,
    pub authorizer: ClaimAuthorizer,
    pub contracts: ContractAddresses,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn InsuranceLedger>,
        verifier: AttestationVerifier,
        prover: OwnershipProver,
        db: OracleDatabase,
        contracts: ContractAddresses,
    ) -> Self {
        let verifier = Arc::new(verifier);
        let db = Arc::new(db);
        let authorizer =
            ClaimAuthorizer::new(ledger.clone(), verifier.clone(), prover, db.clone());
        Self {
            ledger,
            verifier,
            db,
            authorizer,
            contracts,
        }
    }
}
