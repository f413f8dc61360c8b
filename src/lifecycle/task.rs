//! Operational task lifecycle.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum TaskStatus as "TaskStatus" {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Blocked => "BLOCKED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

pub fn machine() -> Result<StateMachine<TaskStatus>, BuildError> {
    use TaskStatus::*;

    StateMachine::builder()
        .transitions(Pending, [InProgress, Blocked, Cancelled])
        .transitions(InProgress, [Completed, Blocked, Cancelled])
        .transitions(Blocked, [Pending, InProgress, Cancelled])
        .transitions(Completed, [])
        .transitions(Cancelled, [])
        .terminal([Completed, Cancelled])
        .requires_reason([Blocked, Cancelled])
        .build()
}

impl EntityKind for TaskStatus {
    const ENTITY_TYPE: &'static str = "Task";
    const ACTION_PREFIX: &'static str = "task";
    const INITIAL: Self = TaskStatus::Pending;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::TaskWrite);

    fn transition_permission(_to: Self) -> Permission {
        Permission::TaskComplete
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.task()
    }
}
