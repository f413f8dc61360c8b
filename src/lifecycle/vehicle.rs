//! Vehicle availability lifecycle.
//!
//! The graph is cycle-capable: a vehicle keeps circulating between
//! availability, rental, inspection and holds for its whole service life, so
//! no state is terminal. Operations staff with `fleet:override` can force a
//! vehicle back to AVAILABLE, into maintenance, or out of service from
//! anywhere.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum VehicleStatus as "VehicleStatus" {
        Available => "AVAILABLE",
        ReservedPrepPending => "RESERVED_PREP_PENDING",
        PickupReady => "PICKUP_READY",
        OnRent => "ON_RENT",
        ReturnPendingCheckin => "RETURN_PENDING_CHECKIN",
        InspectionInProgress => "INSPECTION_IN_PROGRESS",
        CleaningPending => "CLEANING_PENDING",
        MaintenancePending => "MAINTENANCE_PENDING",
        DamageHold => "DAMAGE_HOLD",
        ComplianceHold => "COMPLIANCE_HOLD",
        TransferPending => "TRANSFER_PENDING",
        TransferInTransit => "TRANSFER_IN_TRANSIT",
        OutOfService => "OUT_OF_SERVICE",
    }
}

pub fn machine() -> Result<StateMachine<VehicleStatus>, BuildError> {
    use VehicleStatus::*;

    StateMachine::builder()
        .transitions(
            Available,
            [ReservedPrepPending, MaintenancePending, OutOfService, TransferPending],
        )
        .transitions(ReservedPrepPending, [PickupReady, Available])
        .transitions(PickupReady, [OnRent, Available])
        .transitions(OnRent, [ReturnPendingCheckin])
        .transitions(ReturnPendingCheckin, [InspectionInProgress])
        .transitions(InspectionInProgress, [CleaningPending, DamageHold, Available])
        .transitions(CleaningPending, [Available, MaintenancePending])
        .transitions(MaintenancePending, [Available, OutOfService])
        .transitions(DamageHold, [MaintenancePending, OutOfService, Available])
        .transitions(ComplianceHold, [Available, OutOfService])
        .transitions(TransferPending, [TransferInTransit])
        .transitions(TransferInTransit, [Available])
        .transitions(OutOfService, [Available, MaintenancePending])
        .override_allowed([Available, OutOfService, MaintenancePending])
        .requires_reason([OutOfService, DamageHold, ComplianceHold])
        .build()
}

impl EntityKind for VehicleStatus {
    const ENTITY_TYPE: &'static str = "Vehicle";
    const ACTION_PREFIX: &'static str = "vehicle";
    const INITIAL: Self = VehicleStatus::Available;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::FleetWrite);
    const OVERRIDE_PERMISSION: Option<Permission> = Some(Permission::FleetOverride);

    fn transition_permission(_to: Self) -> Permission {
        Permission::FleetTransition
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.vehicle()
    }
}
