//! The seven fleet-operations lifecycles.
//!
//! Each entity kind is a state enumeration plus an [`EntityKind`]
//! implementation that binds it to its audit names, its initial state, and
//! the permissions gating it. [`Lifecycles`] builds every machine once and
//! hands out shared references; nothing mutates a machine after startup.

mod approval;
mod claim;
mod inspection;
mod maintenance;
mod rental;
mod task;
mod vehicle;

pub use approval::ApprovalStatus;
pub use claim::ClaimStatus;
pub use inspection::InspectionStatus;
pub use maintenance::MaintenanceStatus;
pub use rental::RentalStatus;
pub use task::TaskStatus;
pub use vehicle::VehicleStatus;

use crate::core::State;
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;
use tracing::debug;

/// A state enumeration that is the lifecycle of a persisted entity.
pub trait EntityKind: State {
    /// Entity type recorded in audit entries, e.g. `Vehicle`.
    const ENTITY_TYPE: &'static str;

    /// Prefix of audit actions, e.g. `vehicle` in `vehicle.status_change`.
    const ACTION_PREFIX: &'static str;

    /// State a newly created entity starts in.
    const INITIAL: Self;

    /// Permission needed to create the entity. `None` means creation is
    /// open to every authenticated actor.
    const CREATE_PERMISSION: Option<Permission>;

    /// Whether [`TransitionService::create`] may open entities of this
    /// kind. `false` for kinds whose creation carries data of its own.
    ///
    /// [`TransitionService::create`]: crate::service::TransitionService::create
    const DIRECT_CREATE: bool = true;

    /// Permission that turns a transition request into an override.
    /// `None` means overrides are never honoured for this kind.
    const OVERRIDE_PERMISSION: Option<Permission> = None;

    /// The single permission checked before a transition into `to`.
    fn transition_permission(to: Self) -> Permission;

    /// Whether [`TransitionService::transition`] may commit a move into
    /// `to`. Targets with preconditions of their own answer `false` and are
    /// committed only by their dedicated service.
    ///
    /// [`TransitionService::transition`]: crate::service::TransitionService::transition
    fn accepts_direct_transition(_to: Self) -> bool {
        true
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self>;
}

/// Every lifecycle machine, built and validated once.
#[derive(Clone, Debug)]
pub struct Lifecycles {
    vehicle: StateMachine<VehicleStatus>,
    rental: StateMachine<RentalStatus>,
    task: StateMachine<TaskStatus>,
    maintenance: StateMachine<MaintenanceStatus>,
    claim: StateMachine<ClaimStatus>,
    approval: StateMachine<ApprovalStatus>,
    inspection: StateMachine<InspectionStatus>,
}

impl Lifecycles {
    /// Build the standard fleet-operations machines.
    ///
    /// Fails only if a compiled-in graph is malformed, which the tests in
    /// this module rule out.
    pub fn standard() -> Result<Self, BuildError> {
        let lifecycles = Self {
            vehicle: vehicle::machine()?,
            rental: rental::machine()?,
            task: task::machine()?,
            maintenance: maintenance::machine()?,
            claim: claim::machine()?,
            approval: approval::machine()?,
            inspection: inspection::machine()?,
        };
        debug!("built standard lifecycles");
        Ok(lifecycles)
    }

    pub fn vehicle(&self) -> &StateMachine<VehicleStatus> {
        &self.vehicle
    }

    pub fn rental(&self) -> &StateMachine<RentalStatus> {
        &self.rental
    }

    pub fn task(&self) -> &StateMachine<TaskStatus> {
        &self.task
    }

    pub fn maintenance(&self) -> &StateMachine<MaintenanceStatus> {
        &self.maintenance
    }

    pub fn claim(&self) -> &StateMachine<ClaimStatus> {
        &self.claim
    }

    pub fn approval(&self) -> &StateMachine<ApprovalStatus> {
        &self.approval
    }

    pub fn inspection(&self) -> &StateMachine<InspectionStatus> {
        &self.inspection
    }

    /// The machine for entity kind `K`.
    ///
    /// ```
    /// use fleet_lifecycle::lifecycle::{Lifecycles, TaskStatus};
    ///
    /// let lifecycles = Lifecycles::standard().unwrap();
    /// let tasks = lifecycles.machine::<TaskStatus>();
    /// assert!(tasks.is_terminal(TaskStatus::Completed));
    /// ```
    pub fn machine<K: EntityKind>(&self) -> &StateMachine<K> {
        K::machine(self)
    }
}
