// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim and policy records as stored by the Curance contracts.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claim lifecycle status (matches the `uint8` used by the claims contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ClaimStatus {
    None = 0,
    Pending = 1,
    Verified = 2,
    Enabled = 3,
    Settled = 4,
    Rejected = 5,
}

impl ClaimStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in API responses.
    pub fn name(self) -> &'static str {
        match self {
            ClaimStatus::None => "NONE",
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Verified => "VERIFIED",
            ClaimStatus::Enabled => "ENABLED",
            ClaimStatus::Settled => "SETTLED",
            ClaimStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ClaimStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => ClaimStatus::None,
            1 => ClaimStatus::Pending,
            2 => ClaimStatus::Verified,
            3 => ClaimStatus::Enabled,
            4 => ClaimStatus::Settled,
            5 => ClaimStatus::Rejected,
            other => return Err(other),
        })
    }
}

/// A claim record keyed by claim id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub policy_commitment: B256,
    /// Hospital that filed the claim.
    pub hospital: Address,
    /// Amount in USDC base units (6 decimals).
    pub amount: U256,
    pub invoice_hash: B256,
    pub status: ClaimStatus,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub updated_at: u64,
}

/// A policy record keyed by commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub premium: U256,
    pub coverage_amount: U256,
    pub used_coverage: U256,
    /// Unix seconds.
    pub start_time: u64,
    /// Unix seconds.
    pub expiry_time: u64,
    pub is_active: bool,
}

impl Policy {
    pub fn remaining_coverage(&self) -> U256 {
        self.coverage_amount.saturating_sub(self.used_coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for code in 0u8..=5 {
            let status = ClaimStatus::try_from(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(ClaimStatus::try_from(6), Err(6));
    }

    #[test]
    fn status_names_are_upper_case() {
        assert_eq!(ClaimStatus::Pending.to_string(), "PENDING");
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Enabled).unwrap(),
            "\"ENABLED\""
        );
    }

    #[test]
    fn remaining_coverage_never_underflows() {
        let policy = Policy {
            premium: U256::from(10),
            coverage_amount: U256::from(100),
            used_coverage: U256::from(150),
            start_time: 0,
            expiry_time: 0,
            is_active: true,
        };
        assert_eq!(policy.remaining_coverage(), U256::ZERO);
    }
}
