//! Approval request lifecycle.
//!
//! The engine treats expiry like any other edge. Forcing an overdue request
//! to EXPIRED before a decision is accepted is done by
//! [`ApprovalService`](crate::service::ApprovalService), which is given the
//! current time explicitly. APPROVED and DENIED are therefore closed to the
//! generic transition path.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum ApprovalStatus as "ApprovalStatus" {
        Pending => "PENDING",
        Escalated => "ESCALATED",
        Approved => "APPROVED",
        Denied => "DENIED",
        Expired => "EXPIRED",
    }
}

pub fn machine() -> Result<StateMachine<ApprovalStatus>, BuildError> {
    use ApprovalStatus::*;

    StateMachine::builder()
        .transitions(Pending, [Approved, Denied, Expired, Escalated])
        .transitions(Escalated, [Approved, Denied, Expired])
        .transitions(Approved, [])
        .transitions(Denied, [])
        .transitions(Expired, [])
        .terminal([Approved, Denied, Expired])
        .requires_reason([Denied])
        .build()
}

impl EntityKind for ApprovalStatus {
    const ENTITY_TYPE: &'static str = "ApprovalRequest";
    const ACTION_PREFIX: &'static str = "approval";
    const INITIAL: Self = ApprovalStatus::Pending;
    const CREATE_PERMISSION: Option<Permission> = None;
    const DIRECT_CREATE: bool = false;

    fn transition_permission(_to: Self) -> Permission {
        Permission::ApprovalDecide
    }

    fn accepts_direct_transition(to: Self) -> bool {
        !matches!(to, ApprovalStatus::Approved | ApprovalStatus::Denied)
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.approval()
    }
}
