//! Entity persistence with atomic state-plus-audit commits.
//!
//! A [`LifecycleStore`] owns both the entity records and the audit log, so a
//! committed transition can never leave a state change without its audit
//! entry or the reverse. Concurrent writers are serialized by
//! compare-and-swap on the record version.

use crate::audit::{AuditEntry, AuditLog, InMemoryAuditLog, NewAuditEntry};
use crate::lifecycle::{ApprovalStatus, EntityKind};
use crate::service::approval::ApprovalDetails;
use crate::service::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An entity's lifecycle state as held by a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct EntityRecord<K: EntityKind> {
    pub id: String,
    pub state: K,
    /// Incremented on every committed transition.
    pub version: u64,
    pub branch_id: Option<String>,
    /// Deadline after which the entity may no longer be decided.
    pub expires_at: Option<DateTime<Utc>>,
}

impl<K: EntityKind> EntityRecord<K> {
    /// A version-zero record in the kind's initial state.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: K::INITIAL,
            version: 0,
            branch_id: None,
            expires_at: None,
        }
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// A state change to apply if the record is still at `expected_version`.
#[derive(Clone, Debug)]
pub struct TransitionCommit<K: EntityKind> {
    pub entity_id: String,
    pub expected_version: u64,
    pub to: K,
    pub audit: NewAuditEntry,
}

pub trait LifecycleStore {
    /// Persist a new record together with its creation audit entry.
    fn insert<K: EntityKind>(
        &mut self,
        record: EntityRecord<K>,
        audit: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError>;

    fn load<K: EntityKind>(&self, entity_id: &str) -> Result<EntityRecord<K>, StoreError>;

    /// Apply the state change and append the audit entry, or do neither.
    fn commit<K: EntityKind>(
        &mut self,
        commit: TransitionCommit<K>,
    ) -> Result<AuditEntry, StoreError>;

    /// Persist a new approval request together with what it asks for and
    /// its creation audit entry.
    fn insert_approval(
        &mut self,
        record: EntityRecord<ApprovalStatus>,
        details: ApprovalDetails,
        audit: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError>;

    fn approval_details(&self, entity_id: &str) -> Result<ApprovalDetails, StoreError>;

    /// The audit trail, oldest first.
    fn audit_entries(&self) -> &[AuditEntry];
}

#[derive(Clone, Debug)]
struct StoredRecord {
    state: &'static str,
    version: u64,
    branch_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Store held in process memory, shared by every entity kind.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    records: HashMap<(&'static str, String), StoredRecord>,
    approvals: HashMap<String, ApprovalDetails>,
    audit: InMemoryAuditLog,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit_log(&self) -> &InMemoryAuditLog {
        &self.audit
    }
}

impl LifecycleStore for InMemoryStore {
    fn insert<K: EntityKind>(
        &mut self,
        record: EntityRecord<K>,
        audit: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError> {
        let key = (K::ENTITY_TYPE, record.id);
        if self.records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity_type: K::ENTITY_TYPE,
                entity_id: key.1,
            });
        }

        self.records.insert(
            key,
            StoredRecord {
                state: record.state.name(),
                version: record.version,
                branch_id: record.branch_id,
                expires_at: record.expires_at,
            },
        );
        Ok(self.audit.record(audit))
    }

    fn load<K: EntityKind>(&self, entity_id: &str) -> Result<EntityRecord<K>, StoreError> {
        let stored = self
            .records
            .get(&(K::ENTITY_TYPE, entity_id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                entity_type: K::ENTITY_TYPE,
                entity_id: entity_id.to_string(),
            })?;

        Ok(EntityRecord {
            id: entity_id.to_string(),
            state: K::parse(stored.state)?,
            version: stored.version,
            branch_id: stored.branch_id.clone(),
            expires_at: stored.expires_at,
        })
    }

    fn commit<K: EntityKind>(
        &mut self,
        commit: TransitionCommit<K>,
    ) -> Result<AuditEntry, StoreError> {
        let key = (K::ENTITY_TYPE, commit.entity_id);
        let Some(stored) = self.records.get_mut(&key) else {
            return Err(StoreError::NotFound {
                entity_type: K::ENTITY_TYPE,
                entity_id: key.1,
            });
        };

        if stored.version != commit.expected_version {
            return Err(StoreError::Conflict {
                entity_type: K::ENTITY_TYPE,
                entity_id: key.1,
                expected: commit.expected_version,
                found: stored.version,
            });
        }

        stored.state = commit.to.name();
        stored.version += 1;
        Ok(self.audit.record(commit.audit))
    }

    fn insert_approval(
        &mut self,
        record: EntityRecord<ApprovalStatus>,
        details: ApprovalDetails,
        audit: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError> {
        let entity_id = record.id.clone();
        let entry = self.insert(record, audit)?;
        self.approvals.insert(entity_id, details);
        Ok(entry)
    }

    fn approval_details(&self, entity_id: &str) -> Result<ApprovalDetails, StoreError> {
        self.approvals
            .get(entity_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity_type: ApprovalStatus::ENTITY_TYPE,
                entity_id: entity_id.to_string(),
            })
    }

    fn audit_entries(&self) -> &[AuditEntry] {
        self.audit.entries()
    }
}
