// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim authorization.
//!
//! The oracle only acts on PENDING claims. For those it checks, in order,
//! that the policy is valid, that the invoice evidence holds and that the
//! caller owns the policy. The first failing check rejects the claim
//! on-chain with its reason; if every check passes the claim is enabled,
//! which lets the claims contract settle it.
//!
//! Each decision is written to the decision log before the contract call is
//! sent. A request for a claim that is still PENDING but already has a
//! recorded decision replays that decision.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{TxHash, B256};
use serde_json::Value;

use crate::attestation::{Attestation, AttestationVerifier};
use crate::chain::{ChainError, Claim, ClaimStatus, InsuranceLedger};
use crate::legacy::{self, InvoiceProof};
use crate::ownership::{OwnershipProof, OwnershipProver};
use crate::storage::{DecisionAction, DecisionRecord, OracleDatabase, StoreError};

/// Rejection reason when the policy is inactive or expired.
pub const POLICY_INVALID_REASON: &str = "Policy is not valid or has expired";
/// Rejection reason when a legacy invoice proof fails its checks.
pub const INVOICE_PROOF_FAILED_REASON: &str = "Invoice proof verification failed";
/// Rejection reason when a legacy invoice proof names another invoice.
pub const INVOICE_HASH_MISMATCH_REASON: &str = "Invoice hash mismatch";

/// Invoice evidence supplied with a claim.
#[derive(Debug, Clone)]
pub enum InvoiceEvidence {
    /// zkTLS attestation over the hospital's invoice.
    Attestation(Box<Attestation>),
    /// Legacy hospital-signed proof.
    Legacy(InvoiceProof),
}

impl InvoiceEvidence {
    /// Exactly one kind of evidence must be present.
    pub fn from_parts(
        attestation: Option<Attestation>,
        proof: Option<InvoiceProof>,
    ) -> Option<Self> {
        match (attestation, proof) {
            (Some(attestation), None) => Some(Self::Attestation(Box::new(attestation))),
            (None, Some(proof)) => Some(Self::Legacy(proof)),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attestation(_) => "attestation",
            Self::Legacy(_) => "legacy",
        }
    }
}

/// A request to authorize one claim.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub claim_id: B256,
    pub invoice: InvoiceEvidence,
    pub ownership: OwnershipProof,
}

/// Result of an authorization attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The claim was enabled on-chain.
    Enabled {
        status: ClaimStatus,
        tx_hash: TxHash,
        /// Attested invoice data, when the evidence was an attestation.
        invoice_data: Option<Value>,
    },
    /// The claim was rejected on-chain with `reason`.
    Rejected { reason: String, tx_hash: TxHash },
    /// The claim is not PENDING; nothing was sent.
    NotPending(ClaimStatus),
    /// No such claim.
    NotFound,
}

/// Infrastructure failures during authorization.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Decision log error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of running the checks, before anything is sent.
#[derive(Debug, Clone, PartialEq)]
enum Verdict {
    Enable { invoice_data: Option<Value> },
    Reject { reason: String },
}

impl Verdict {
    fn reject(reason: impl Into<String>) -> Self {
        Verdict::Reject {
            reason: reason.into(),
        }
    }
}

/// Turns claim state plus proofs into an enable or reject call.
#[derive(Clone)]
pub struct ClaimAuthorizer {
    ledger: Arc<dyn InsuranceLedger>,
    verifier: Arc<AttestationVerifier>,
    prover: OwnershipProver,
    db: Arc<OracleDatabase>,
}

impl ClaimAuthorizer {
    pub fn new(
        ledger: Arc<dyn InsuranceLedger>,
        verifier: Arc<AttestationVerifier>,
        prover: OwnershipProver,
        db: Arc<OracleDatabase>,
    ) -> Self {
        Self {
            ledger,
            verifier,
            prover,
            db,
        }
    }

    pub async fn authorize(&self, request: &ClaimRequest) -> Result<ClaimOutcome, ClaimError> {
        let claim_id = request.claim_id;

        let Some(claim) = self.ledger.get_claim(claim_id).await? else {
            return Ok(ClaimOutcome::NotFound);
        };

        if claim.status != ClaimStatus::Pending {
            tracing::info!(claim_id = %claim_id, status = %claim.status, "Claim is not pending");
            return Ok(ClaimOutcome::NotPending(claim.status));
        }

        if let Some(recorded) = self.db.get_decision(&claim_id)? {
            tracing::warn!(
                claim_id = %claim_id,
                decision_id = %recorded.decision_id,
                confirmed = recorded.is_confirmed(),
                "Replaying recorded decision for pending claim"
            );
            return self.execute(claim_id, &recorded.action, None).await;
        }

        let verdict = self.evaluate(&claim, request).await?;
        let (action, invoice_data) = match verdict {
            Verdict::Enable { invoice_data } => (DecisionAction::Enable, invoice_data),
            Verdict::Reject { reason } => {
                tracing::info!(claim_id = %claim_id, reason = %reason, "Rejecting claim");
                (DecisionAction::Reject { reason }, None)
            }
        };

        self.db
            .record_decision(&DecisionRecord::new(&claim_id, action.clone()))?;
        self.execute(claim_id, &action, invoice_data).await
    }

    /// Run the checks in order, stopping at the first failure.
    async fn evaluate(&self, claim: &Claim, request: &ClaimRequest) -> Result<Verdict, ClaimError> {
        if !self.ledger.is_policy_valid(claim.policy_commitment).await? {
            return Ok(Verdict::reject(POLICY_INVALID_REASON));
        }

        let invoice_data = match &request.invoice {
            InvoiceEvidence::Attestation(attestation) => {
                match self.verifier.verify_invoice(attestation) {
                    Ok(verified) => Some(verified.data),
                    Err(e) => return Ok(Verdict::reject(e.to_string())),
                }
            }
            InvoiceEvidence::Legacy(proof) => {
                if let Err(e) = legacy::verify_invoice_proof(proof) {
                    tracing::debug!(error = %e, "Legacy invoice proof failed");
                    return Ok(Verdict::reject(INVOICE_PROOF_FAILED_REASON));
                }
                if B256::from_str(proof.invoice_hash.trim()).ok() != Some(claim.invoice_hash) {
                    return Ok(Verdict::reject(INVOICE_HASH_MISMATCH_REASON));
                }
                None
            }
        };

        let health_data_hash = self.db.health_data_hash(&claim.policy_commitment)?;
        match self.prover.prove(
            &request.ownership,
            &claim.policy_commitment,
            health_data_hash.as_ref(),
        ) {
            Ok(path) => {
                tracing::debug!(claim_id = %request.claim_id, ?path, "Ownership proven");
            }
            Err(e) => return Ok(Verdict::reject(e.to_string())),
        }

        Ok(Verdict::Enable { invoice_data })
    }

    async fn execute(
        &self,
        claim_id: B256,
        action: &DecisionAction,
        invoice_data: Option<Value>,
    ) -> Result<ClaimOutcome, ClaimError> {
        // Once a write has confirmed, later failures must not hide its hash.
        match action {
            DecisionAction::Enable => {
                let tx_hash = self.ledger.enable_claim(claim_id).await?;
                self.confirm(claim_id, tx_hash);
                let status = match self.ledger.get_claim_status(claim_id).await {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(
                            claim_id = %claim_id,
                            tx_hash = %tx_hash,
                            error = %e,
                            "Status read after enableClaim failed, assuming ENABLED"
                        );
                        ClaimStatus::Enabled
                    }
                };
                Ok(ClaimOutcome::Enabled {
                    status,
                    tx_hash,
                    invoice_data,
                })
            }
            DecisionAction::Reject { reason } => {
                let tx_hash = self.ledger.reject_claim(claim_id, reason).await?;
                self.confirm(claim_id, tx_hash);
                Ok(ClaimOutcome::Rejected {
                    reason: reason.clone(),
                    tx_hash,
                })
            }
        }
    }

    fn confirm(&self, claim_id: B256, tx_hash: TxHash) {
        if let Err(e) = self.db.mark_confirmed(&claim_id, &tx_hash) {
            tracing::error!(
                claim_id = %claim_id,
                tx_hash = %tx_hash,
                error = %e,
                "Failed to record confirmed transaction"
            );
        }
    }
}
