//! Vehicle inspection lifecycle.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum InspectionStatus as "InspectionStatus" {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Disputed => "DISPUTED",
    }
}

pub fn machine() -> Result<StateMachine<InspectionStatus>, BuildError> {
    use InspectionStatus::*;

    StateMachine::builder()
        .transitions(Pending, [InProgress])
        .transitions(InProgress, [Completed, Disputed])
        .transitions(Completed, [])
        .transitions(Disputed, [InProgress])
        .terminal([Completed])
        .build()
}

impl EntityKind for InspectionStatus {
    const ENTITY_TYPE: &'static str = "Inspection";
    const ACTION_PREFIX: &'static str = "inspection";
    const INITIAL: Self = InspectionStatus::Pending;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::PickupExecute);

    fn transition_permission(_to: Self) -> Permission {
        Permission::PickupExecute
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.inspection()
    }
}
