//! Append-only audit trail.
//!
//! Every entity creation and every committed status change produces exactly
//! one [`AuditEntry`]. Entries are never mutated or removed; the log only
//! grows. Reading is done through [`AuditQuery`] and bulk extraction through
//! [`AuditExport`].

mod error;
mod export;
mod query;

pub use error::ExportError;
pub use export::{AuditExport, EXPORT_VERSION};
pub use query::{AuditPage, AuditQuery, DEFAULT_LIMIT, MAX_LIMIT};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Immutable record of one state change.
///
/// States are stored in their wire form (`ON_RENT`), so entries from every
/// entity kind share one log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: String,
    /// Dotted action name, e.g. `vehicle.status_change`.
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    /// `None` for creation entries.
    pub previous_state: Option<String>,
    pub new_state: String,
    pub reason: Option<String>,
    pub branch_id: Option<String>,
    /// Extra facts about the change, e.g. what an approval request targets.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// An audit entry before the log has assigned its id and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub actor_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub previous_state: Option<String>,
    pub new_state: String,
    pub reason: Option<String>,
    pub branch_id: Option<String>,
    pub context: BTreeMap<String, String>,
}

impl NewAuditEntry {
    /// Stamp the entry with a fresh id.
    pub fn stamp(self, timestamp: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            actor_id: self.actor_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            previous_state: self.previous_state,
            new_state: self.new_state,
            reason: self.reason,
            branch_id: self.branch_id,
            context: self.context,
            timestamp,
        }
    }
}

/// Append-only sink for audit entries.
pub trait AuditLog {
    /// Append an entry and return it as stored.
    fn record(&mut self, entry: NewAuditEntry) -> AuditEntry;

    /// Every entry, oldest first.
    fn entries(&self) -> &[AuditEntry];
}

/// Audit log held in process memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Vec<AuditEntry>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&mut self, entry: NewAuditEntry) -> AuditEntry {
        let entry = entry.stamp(Utc::now());
        self.entries.push(entry.clone());
        entry
    }

    fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }
}

#[cfg(test)]
pub(crate) fn sample_entry(action: &str, entity_id: &str) -> NewAuditEntry {
    NewAuditEntry {
        actor_id: "user-1".to_string(),
        action: action.to_string(),
        entity_type: "Vehicle".to_string(),
        entity_id: entity_id.to_string(),
        previous_state: Some("AVAILABLE".to_string()),
        new_state: "OUT_OF_SERVICE".to_string(),
        reason: Some("brake failure".to_string()),
        branch_id: Some("branch-north".to_string()),
        context: BTreeMap::new(),
    }
}
