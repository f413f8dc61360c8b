//! Rental contract lifecycle.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum RentalStatus as "RentalStatus" {
        Draft => "DRAFT",
        Confirmed => "CONFIRMED",
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        NoShow => "NO_SHOW",
        Closed => "CLOSED",
    }
}

/// Rentals declare no override targets: a cancelled or closed contract is
/// never reopened, with or without override.
pub fn machine() -> Result<StateMachine<RentalStatus>, BuildError> {
    use RentalStatus::*;

    StateMachine::builder()
        .transitions(Draft, [Confirmed, Cancelled])
        .transitions(Confirmed, [Active, Cancelled])
        .transitions(Active, [Completed, Cancelled])
        .transitions(Completed, [Closed])
        .transitions(Cancelled, [])
        .transitions(NoShow, [])
        .transitions(Closed, [])
        .terminal([Cancelled, Closed])
        .requires_reason([Cancelled])
        .build()
}

impl EntityKind for RentalStatus {
    const ENTITY_TYPE: &'static str = "Rental";
    const ACTION_PREFIX: &'static str = "rental";
    const INITIAL: Self = RentalStatus::Draft;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::RentalWrite);

    fn transition_permission(to: Self) -> Permission {
        match to {
            RentalStatus::Cancelled => Permission::RentalCancel,
            _ => Permission::RentalWrite,
        }
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.rental()
    }
}
