//! Filtering and pagination over audit entries.

use super::AuditEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

/// Filter over the audit trail.
///
/// Unset fields match everything. `action` matches by substring so that
/// `"vehicle."` selects every vehicle action; all other text fields match
/// exactly. The time range is inclusive at both ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub actor_id: Option<String>,
    pub action: Option<String>,
    pub branch_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            entity_type: None,
            entity_id: None,
            actor_id: None,
            action: None,
            branch_id: None,
            from: None,
            to: None,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of query results, newest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Select a page. Page 0 is treated as page 1 and the limit is clamped
    /// to `1..=MAX_LIMIT`.
    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        fn eq(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }

        eq(&self.entity_type, &entry.entity_type)
            && eq(&self.entity_id, &entry.entity_id)
            && eq(&self.actor_id, &entry.actor_id)
            && self
                .action
                .as_deref()
                .map_or(true, |a| entry.action.contains(a))
            && self
                .branch_id
                .as_deref()
                .map_or(true, |b| entry.branch_id.as_deref() == Some(b))
            && self.from.map_or(true, |from| entry.timestamp >= from)
            && self.to.map_or(true, |to| entry.timestamp <= to)
    }

    /// Run the query over entries stored oldest first.
    pub fn run(&self, entries: &[AuditEntry]) -> AuditPage {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, MAX_LIMIT);

        let matching: Vec<&AuditEntry> = entries.iter().rev().filter(|e| self.matches(e)).collect();
        let total = matching.len();

        let entries = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        AuditPage {
            entries,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}
