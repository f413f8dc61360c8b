//! Maintenance request lifecycle.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum MaintenanceStatus as "MaintenanceStatus" {
        Requested => "REQUESTED",
        Approved => "APPROVED",
        Scheduled => "SCHEDULED",
        InProgress => "IN_PROGRESS",
        Paused => "PAUSED",
        NeedsRecheck => "NEEDS_RECHECK",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        Denied => "DENIED",
    }
}

pub fn machine() -> Result<StateMachine<MaintenanceStatus>, BuildError> {
    use MaintenanceStatus::*;

    StateMachine::builder()
        .transitions(Requested, [Approved, Denied, Cancelled])
        .transitions(Approved, [Scheduled, Cancelled])
        .transitions(Scheduled, [InProgress, Cancelled])
        .transitions(InProgress, [Completed, Paused, NeedsRecheck])
        .transitions(Paused, [InProgress, Cancelled])
        .transitions(NeedsRecheck, [InProgress, Completed])
        .transitions(Completed, [])
        .transitions(Cancelled, [])
        .transitions(Denied, [])
        .terminal([Completed, Cancelled, Denied])
        .requires_reason([Denied, Cancelled, Paused])
        .build()
}

impl EntityKind for MaintenanceStatus {
    const ENTITY_TYPE: &'static str = "MaintenanceRequest";
    const ACTION_PREFIX: &'static str = "maintenance";
    const INITIAL: Self = MaintenanceStatus::Requested;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::MaintenanceRequest);

    fn transition_permission(_to: Self) -> Permission {
        Permission::MaintenanceApprove
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.maintenance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_work_cannot_be_cancelled_directly() {
        let result = machine()
            .unwrap()
            .validate(MaintenanceStatus::InProgress, MaintenanceStatus::Cancelled, false);
        assert!(!result.valid);
        assert_eq!(
            result.allowed_transitions,
            vec![
                MaintenanceStatus::Completed,
                MaintenanceStatus::Paused,
                MaintenanceStatus::NeedsRecheck
            ]
        );
    }

    #[test]
    fn pausing_needs_reason() {
        let result = machine()
            .unwrap()
            .validate(MaintenanceStatus::InProgress, MaintenanceStatus::Paused, false);
        assert!(result.valid);
        assert!(result.reason_required);
    }

    #[test]
    fn recheck_can_complete() {
        let result = machine()
            .unwrap()
            .validate(MaintenanceStatus::NeedsRecheck, MaintenanceStatus::Completed, false);
        assert!(result.valid);
        assert!(!result.reason_required);
    }
}
