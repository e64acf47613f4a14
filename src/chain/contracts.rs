// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Curance registry and claims contract client.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;

use super::ledger::{ChainError, InsuranceLedger};
use super::types::{Claim, ClaimStatus, Policy};

// Define the contract interfaces using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface ICuranceRegistry {
        function getPolicy(bytes32 commitment) external view returns (uint256 premium, uint256 coverageAmount, uint256 usedCoverage, uint256 startTime, uint256 expiryTime, bool isActive);
        function isPolicyValid(bytes32 commitment) external view returns (bool);
    }

    #[sol(rpc)]
    interface ICuranceClaims {
        function getClaim(bytes32 claimId) external view returns (bytes32 policyCommitment, address hospital, uint256 amount, bytes32 invoiceHash, uint8 status, uint256 createdAt, uint256 updatedAt);
        function getClaimStatus(bytes32 claimId) external view returns (uint8);
        function enableClaim(bytes32 claimId) external;
        function rejectClaim(bytes32 claimId, string calldata reason) external;
    }
}

/// Connection settings for [`CuranceContracts`].
#[derive(Debug, Clone)]
pub struct ContractSettings {
    pub rpc_url: url::Url,
    pub registry: Address,
    pub claims: Address,
    /// Bound on each contract read.
    pub read_timeout: Duration,
    /// Bound on each write, from submission to confirmed receipt.
    pub write_timeout: Duration,
}

/// Contract client signing writes with the oracle key.
pub struct CuranceContracts {
    registry: ICuranceRegistry::ICuranceRegistryInstance<DynProvider>,
    claims: ICuranceClaims::ICuranceClaimsInstance<DynProvider>,
    oracle: Address,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl CuranceContracts {
    /// Connect to the contracts with the given oracle private key.
    pub fn connect(settings: ContractSettings, private_key_hex: &str) -> Result<Self, ChainError> {
        let signer = create_signer(private_key_hex)?;
        let oracle = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(settings.rpc_url)
            .erased();

        Ok(Self {
            registry: ICuranceRegistry::new(settings.registry, provider.clone()),
            claims: ICuranceClaims::new(settings.claims, provider),
            oracle,
            read_timeout: settings.read_timeout,
            write_timeout: settings.write_timeout,
        })
    }

    /// Address of the oracle account sending transactions.
    pub fn oracle_address(&self) -> Address {
        self.oracle
    }

    async fn read<F, T>(&self, what: &'static str, call: F) -> Result<T, ChainError>
    where
        F: IntoFuture<Output = Result<T, alloy::contract::Error>>,
    {
        tokio::time::timeout(self.read_timeout, call)
            .await
            .map_err(|_| ChainError::Timeout(self.read_timeout.as_secs(), what))?
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    async fn write<F>(&self, what: &'static str, send: F) -> Result<TxHash, ChainError>
    where
        F: Future<Output = Result<TxHash, ChainError>>,
    {
        tokio::time::timeout(self.write_timeout, send)
            .await
            .map_err(|_| ChainError::Timeout(self.write_timeout.as_secs(), what))?
    }
}

/// Create a signer from a hex private key (with or without `0x`).
pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
}

#[async_trait]
impl InsuranceLedger for CuranceContracts {
    async fn get_claim(&self, claim_id: B256) -> Result<Option<Claim>, ChainError> {
        let call = self.claims.getClaim(claim_id);
        let raw = self.read("getClaim", call.call()).await?;

        let status = ClaimStatus::try_from(raw.status).map_err(ChainError::UnknownStatus)?;
        if status == ClaimStatus::None {
            return Ok(None);
        }

        Ok(Some(Claim {
            policy_commitment: raw.policyCommitment,
            hospital: raw.hospital,
            amount: raw.amount,
            invoice_hash: raw.invoiceHash,
            status,
            created_at: raw.createdAt.saturating_to(),
            updated_at: raw.updatedAt.saturating_to(),
        }))
    }

    async fn get_claim_status(&self, claim_id: B256) -> Result<ClaimStatus, ChainError> {
        let call = self.claims.getClaimStatus(claim_id);
        let code = self.read("getClaimStatus", call.call()).await?;
        ClaimStatus::try_from(code).map_err(ChainError::UnknownStatus)
    }

    async fn is_policy_valid(&self, commitment: B256) -> Result<bool, ChainError> {
        let call = self.registry.isPolicyValid(commitment);
        self.read("isPolicyValid", call.call()).await
    }

    async fn get_policy(&self, commitment: B256) -> Result<Option<Policy>, ChainError> {
        let call = self.registry.getPolicy(commitment);
        let raw = self.read("getPolicy", call.call()).await?;

        // Unknown commitments come back as the zero record
        if raw.startTime.is_zero() && raw.coverageAmount.is_zero() {
            return Ok(None);
        }

        Ok(Some(Policy {
            premium: raw.premium,
            coverage_amount: raw.coverageAmount,
            used_coverage: raw.usedCoverage,
            start_time: raw.startTime.saturating_to(),
            expiry_time: raw.expiryTime.saturating_to(),
            is_active: raw.isActive,
        }))
    }

    async fn enable_claim(&self, claim_id: B256) -> Result<TxHash, ChainError> {
        tracing::info!(claim_id = %claim_id, "Enabling claim");
        let call = self.claims.enableClaim(claim_id);

        let tx_hash = self
            .write("enableClaim", async {
                let pending = call
                    .send()
                    .await
                    .map_err(|e| ChainError::ContractError(e.to_string()))?;
                confirm(pending).await
            })
            .await?;

        tracing::info!(claim_id = %claim_id, tx_hash = %tx_hash, "Claim enabled");
        Ok(tx_hash)
    }

    async fn reject_claim(&self, claim_id: B256, reason: &str) -> Result<TxHash, ChainError> {
        tracing::info!(claim_id = %claim_id, reason, "Rejecting claim");
        let call = self.claims.rejectClaim(claim_id, reason.to_string());

        let tx_hash = self
            .write("rejectClaim", async {
                let pending = call
                    .send()
                    .await
                    .map_err(|e| ChainError::ContractError(e.to_string()))?;
                confirm(pending).await
            })
            .await?;

        tracing::info!(claim_id = %claim_id, tx_hash = %tx_hash, "Claim rejected");
        Ok(tx_hash)
    }
}

/// Wait for the receipt and require successful execution.
async fn confirm(
    pending: alloy::providers::PendingTransactionBuilder<alloy::network::Ethereum>,
) -> Result<TxHash, ChainError> {
    let tx_hash = *pending.tx_hash();
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ChainError::RpcError(format!("Failed to get receipt for {tx_hash}: {e}")))?;

    if !receipt.status() {
        return Err(ChainError::TransactionFailed(format!(
            "{tx_hash} reverted in block {:?}",
            receipt.block_number
        )));
    }
    Ok(receipt.transaction_hash)
}
