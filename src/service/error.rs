//! Service and store error types.

use crate::core::UnknownState;
use crate::machine::TransitionError;
use crate::permissions::PermissionDenied;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage-boundary failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity_type} {entity_id} not found")]
    NotFound {
        entity_type: &'static str,
        entity_id: String,
    },

    #[error("{entity_type} {entity_id} already exists")]
    AlreadyExists {
        entity_type: &'static str,
        entity_id: String,
    },

    /// Another writer committed first.
    #[error(
        "{entity_type} {entity_id} was modified concurrently \
         (expected version {expected}, found {found})"
    )]
    Conflict {
        entity_type: &'static str,
        entity_id: String,
        expected: u64,
        found: u64,
    },

    /// A stored state no longer parses as its enumeration.
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] UnknownState),
}

/// Why a create or transition request was refused.
///
/// Nothing is persisted when any of these is returned, with one exception:
/// [`ServiceError::Expired`] is reported after the overdue approval has
/// been moved to EXPIRED.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The target is committed only through the kind's own service, e.g.
    /// approval decisions through `ApprovalService::decide`.
    #[error("{entity_type} cannot move to {target} through a plain transition")]
    DirectTransitionRefused {
        entity_type: &'static str,
        target: &'static str,
    },

    #[error("A reason is required to transition to {target}")]
    ReasonMissing { target: &'static str },

    #[error("Approval request {entity_id} expired at {expired_at}")]
    Expired {
        entity_id: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Approval expiry must be between 1 and {max} hours, got {hours}")]
    InvalidExpiry { hours: u32, max: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
