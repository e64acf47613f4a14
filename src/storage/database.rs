// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded oracle database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `claim_decisions`: claim_id → serialized DecisionRecord
//! - `policy_registrations`: commitment → serialized RegistrationRecord
//!
//! Keys are lowercase `0x`-prefixed 32-byte hex strings.

use std::path::Path;
use std::str::FromStr;

use alloy::primitives::{TxHash, B256};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

/// claim_id → DecisionRecord (JSON bytes).
const CLAIM_DECISIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("claim_decisions");

/// commitment → RegistrationRecord (JSON bytes).
const POLICY_REGISTRATIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("policy_registrations");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Records
// =============================================================================

/// What the oracle decided to do with a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionAction {
    Enable,
    Reject { reason: String },
}

/// A claim decision, persisted before the contract call is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRecord {
    pub decision_id: String,
    pub claim_id: String,
    #[serde(flatten)]
    pub action: DecisionAction,
    pub decided_at: DateTime<Utc>,
    /// Set once the contract call is confirmed.
    pub tx_hash: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl DecisionRecord {
    pub fn new(claim_id: &B256, action: DecisionAction) -> Self {
        Self {
            decision_id: uuid::Uuid::new_v4().to_string(),
            claim_id: claim_id.to_string(),
            action,
            decided_at: Utc::now(),
            tx_hash: None,
            confirmed_at: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.tx_hash.is_some()
    }
}

/// A policy registration verified by the oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub commitment: String,
    pub health_data_hash: String,
    pub premium: String,
    /// Attestors that vouched for the health data (empty for legacy proofs).
    pub attestors: Vec<String>,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationRecord {
    pub fn new(commitment: &B256, health_data_hash: &B256, premium: impl Into<String>) -> Self {
        Self {
            commitment: commitment.to_string(),
            health_data_hash: health_data_hash.to_string(),
            premium: premium.into(),
            attestors: Vec::new(),
            registered_at: Utc::now(),
        }
    }

    pub fn with_attestors(mut self, attestors: impl IntoIterator<Item = String>) -> Self {
        self.attestors = attestors.into_iter().collect();
        self
    }
}

// =============================================================================
// OracleDatabase
// =============================================================================

/// Embedded store for claim decisions and policy registrations.
pub struct OracleDatabase {
    db: Database,
}

impl OracleDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLAIM_DECISIONS)?;
            let _ = write_txn.open_table(POLICY_REGISTRATIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Claim decisions
    // =========================================================================

    /// Insert or replace the decision for a claim.
    pub fn record_decision(&self, record: &DecisionRecord) -> StoreResult<()> {
        self.put(CLAIM_DECISIONS, &record.claim_id, record)
    }

    pub fn get_decision(&self, claim_id: &B256) -> StoreResult<Option<DecisionRecord>> {
        self.get(CLAIM_DECISIONS, &claim_id.to_string())
    }

    /// Attach the confirmed transaction hash to a recorded decision.
    pub fn mark_confirmed(&self, claim_id: &B256, tx_hash: &TxHash) -> StoreResult<()> {
        let key = claim_id.to_string();
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CLAIM_DECISIONS)?;
            let existing = match table.get(key.as_str())? {
                Some(value) => Some(serde_json::from_slice::<DecisionRecord>(value.value())?),
                None => None,
            };
            if let Some(mut record) = existing {
                record.tx_hash = Some(tx_hash.to_string());
                record.confirmed_at = Some(Utc::now());
                let json = serde_json::to_vec(&record)?;
                table.insert(key.as_str(), json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // =========================================================================
    // Policy registrations
    // =========================================================================

    /// Record a registration unless the commitment is already registered.
    ///
    /// Returns `false` when an earlier registration was kept.
    pub fn register_policy(&self, record: &RegistrationRecord) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(POLICY_REGISTRATIONS)?;
            let exists = table.get(record.commitment.as_str())?.is_some();
            if !exists {
                let json = serde_json::to_vec(record)?;
                table.insert(record.commitment.as_str(), json.as_slice())?;
            }
            !exists
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    pub fn get_registration(&self, commitment: &B256) -> StoreResult<Option<RegistrationRecord>> {
        self.get(POLICY_REGISTRATIONS, &commitment.to_string())
    }

    /// The health-data hash a commitment was registered with, if any.
    pub fn health_data_hash(&self, commitment: &B256) -> StoreResult<Option<B256>> {
        Ok(self
            .get_registration(commitment)?
            .and_then(|record| B256::from_str(&record.health_data_hash).ok()))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn put<T: Serialize>(
        &self,
        table_def: TableDefinition<'static, &'static str, &'static [u8]>,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        let json = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(table_def)?;
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get<T: for<'de> Deserialize<'de>>(
        &self,
        table_def: TableDefinition<'static, &'static str, &'static [u8]>,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open() -> (TempDir, OracleDatabase) {
        let dir = TempDir::new().unwrap();
        let db = OracleDatabase::open(&dir.path().join("oracle.redb")).unwrap();
        (dir, db)
    }

    #[test]
    fn decision_is_recorded_then_confirmed() {
        let (_dir, db) = open();
        let claim_id = B256::repeat_byte(0xaa);

        assert!(db.get_decision(&claim_id).unwrap().is_none());

        let record = DecisionRecord::new(
            &claim_id,
            DecisionAction::Reject {
                reason: "Invoice hash mismatch".into(),
            },
        );
        db.record_decision(&record).unwrap();

        let stored = db.get_decision(&claim_id).unwrap().unwrap();
        assert_eq!(stored, record);
        assert!(!stored.is_confirmed());

        let tx_hash = TxHash::repeat_byte(0x77);
        db.mark_confirmed(&claim_id, &tx_hash).unwrap();

        let confirmed = db.get_decision(&claim_id).unwrap().unwrap();
        assert_eq!(confirmed.tx_hash, Some(tx_hash.to_string()));
        assert!(confirmed.confirmed_at.is_some());
    }

    #[test]
    fn mark_confirmed_without_decision_is_a_no_op() {
        let (_dir, db) = open();
        let claim_id = B256::repeat_byte(0xab);
        db.mark_confirmed(&claim_id, &TxHash::ZERO).unwrap();
        assert!(db.get_decision(&claim_id).unwrap().is_none());
    }

    #[test]
    fn first_registration_wins() {
        let (_dir, db) = open();
        let commitment = B256::repeat_byte(0xcc);
        let first = RegistrationRecord::new(&commitment, &B256::repeat_byte(0x01), "100");
        let second = RegistrationRecord::new(&commitment, &B256::repeat_byte(0x02), "100");

        assert!(db.register_policy(&first).unwrap());
        assert!(!db.register_policy(&second).unwrap());
        assert_eq!(
            db.health_data_hash(&commitment).unwrap(),
            Some(B256::repeat_byte(0x01))
        );
    }

    #[test]
    fn decisions_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oracle.redb");
        let claim_id = B256::repeat_byte(0x10);

        {
            let db = OracleDatabase::open(&path).unwrap();
            db.record_decision(&DecisionRecord::new(&claim_id, DecisionAction::Enable))
                .unwrap();
        }

        let db = OracleDatabase::open(&path).unwrap();
        let record = db.get_decision(&claim_id).unwrap().unwrap();
        assert_eq!(record.action, DecisionAction::Enable);
    }

    #[test]
    fn decision_json_is_flat() {
        let record = DecisionRecord::new(
            &B256::ZERO,
            DecisionAction::Reject {
                reason: "r".into(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["action"], "reject");
        assert_eq!(json["reason"], "r");
    }
}
