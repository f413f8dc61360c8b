//! Entity services: the only place lifecycle state changes.
//!
//! Services combine the three pure pieces (the [`PermissionTable`], the
//! [`Lifecycles`] machines and the audit model) with a [`LifecycleStore`].
//! They hold only shared references and can be constructed per request.
//!
//! [`PermissionTable`]: crate::permissions::PermissionTable
//! [`Lifecycles`]: crate::lifecycle::Lifecycles

mod approval;
mod audit;
mod error;
mod store;
mod transition;

pub use approval::{ApprovalDetails, ApprovalService, ApprovalType, Decision, NewApproval};
pub use audit::AuditService;
pub use error::{ServiceError, StoreError};
pub use store::{EntityRecord, InMemoryStore, LifecycleStore, TransitionCommit};
pub use transition::{Actor, TransitionOutcome, TransitionRequest, TransitionService};
