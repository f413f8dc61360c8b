//! Permission-gated, audited lifecycle transitions.

use crate::audit::{AuditEntry, NewAuditEntry};
use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::TransitionValidation;
use crate::permissions::{PermissionTable, Role};
use crate::service::error::ServiceError;
use crate::service::store::{EntityRecord, LifecycleStore, TransitionCommit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// The authenticated user behind a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub branch_id: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            branch_id: None,
        }
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }
}

/// A request to move one entity to a new state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionRequest<K: EntityKind> {
    pub entity_id: String,
    pub to: K,
    pub reason: Option<String>,
    /// Ask for the override path. Honoured only when the actor holds the
    /// kind's override permission.
    pub override_requested: bool,
    /// Version the caller last observed. Defaults to the version just loaded.
    pub expected_version: Option<u64>,
}

impl<K: EntityKind> TransitionRequest<K> {
    pub fn new(entity_id: impl Into<String>, to: K) -> Self {
        Self {
            entity_id: entity_id.into(),
            to,
            reason: None,
            override_requested: false,
            expected_version: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_override(mut self) -> Self {
        self.override_requested = true;
        self
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// The reason with surrounding whitespace removed; blank counts as absent.
    fn reason(&self) -> Option<&str> {
        self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

/// A committed transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome<K: EntityKind> {
    /// The record as it is now stored.
    pub record: EntityRecord<K>,
    pub audit: AuditEntry,
    pub validation: TransitionValidation<K>,
}

/// Orchestrates creation and transitions for every entity kind.
///
/// A transition runs: one gate permission check, the kind's refusal of
/// targets owned by a dedicated service, load, override detection,
/// validation, the reason check, then an atomic commit. The first failing
/// step ends the request with nothing persisted.
#[derive(Clone, Copy, Debug)]
pub struct TransitionService<'a> {
    permissions: &'a PermissionTable,
    lifecycles: &'a Lifecycles,
}

impl<'a> TransitionService<'a> {
    pub fn new(permissions: &'a PermissionTable, lifecycles: &'a Lifecycles) -> Self {
        Self {
            permissions,
            lifecycles,
        }
    }

    pub fn permissions(&self) -> &'a PermissionTable {
        self.permissions
    }

    pub fn lifecycles(&self) -> &'a Lifecycles {
        self.lifecycles
    }

    /// Create an entity in its kind's initial state.
    ///
    /// Kinds with their own creation data (approvals) are refused here.
    ///
    /// The record's state and version are reset to the initial state and
    /// zero; only its id, branch and expiry are taken from the caller.
    pub fn create<K: EntityKind, St: LifecycleStore>(
        &self,
        store: &mut St,
        actor: &Actor,
        record: EntityRecord<K>,
    ) -> Result<AuditEntry, ServiceError> {
        if !K::DIRECT_CREATE {
            return Err(ServiceError::DirectTransitionRefused {
                entity_type: K::ENTITY_TYPE,
                target: K::INITIAL.name(),
            });
        }
        if let Some(permission) = K::CREATE_PERMISSION {
            self.permissions.require(actor.role, permission).inspect_err(|err| {
                warn!(
                    entity_type = K::ENTITY_TYPE,
                    actor = %actor.id,
                    error = %err,
                    "create rejected"
                );
            })?;
        }
        let record = EntityRecord {
            state: K::INITIAL,
            version: 0,
            ..record
        };
        let audit = Self::creation_entry(actor, &record, format!("{}.create", K::ACTION_PREFIX));

        let entity_id = record.id.clone();
        let entry = store.insert(record, audit)?;
        info!(
            entity_type = K::ENTITY_TYPE,
            entity_id = %entity_id,
            state = K::INITIAL.name(),
            actor = %actor.id,
            "entity created"
        );
        Ok(entry)
    }

    /// The audit entry recording `record`'s creation.
    pub(crate) fn creation_entry<K: EntityKind>(
        actor: &Actor,
        record: &EntityRecord<K>,
        action: String,
    ) -> NewAuditEntry {
        NewAuditEntry {
            actor_id: actor.id.clone(),
            action,
            entity_type: K::ENTITY_TYPE.to_string(),
            entity_id: record.id.clone(),
            previous_state: None,
            new_state: record.state.name().to_string(),
            reason: None,
            branch_id: record.branch_id.clone().or_else(|| actor.branch_id.clone()),
            context: BTreeMap::new(),
        }
    }

    /// Move an entity to `request.to`.
    ///
    /// # Example
    ///
    /// ```
    /// use fleet_lifecycle::lifecycle::{Lifecycles, VehicleStatus};
    /// use fleet_lifecycle::permissions::{PermissionTable, Role};
    /// use fleet_lifecycle::service::{
    ///     Actor, EntityRecord, InMemoryStore, LifecycleStore, TransitionRequest,
    ///     TransitionService,
    /// };
    ///
    /// let permissions = PermissionTable::standard();
    /// let lifecycles = Lifecycles::standard().unwrap();
    /// let service = TransitionService::new(&permissions, &lifecycles);
    /// let mut store = InMemoryStore::new();
    ///
    /// let supervisor = Actor::new("u-1", Role::ShiftSupervisor);
    /// service
    ///     .create(&mut store, &supervisor, EntityRecord::<VehicleStatus>::new("v-1"))
    ///     .unwrap();
    ///
    /// let outcome = service
    ///     .transition(
    ///         &mut store,
    ///         &supervisor,
    ///         TransitionRequest::new("v-1", VehicleStatus::OutOfService)
    ///             .with_reason("brake failure"),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(outcome.record.state, VehicleStatus::OutOfService);
    /// assert_eq!(outcome.audit.action, "vehicle.status_change");
    /// assert_eq!(store.audit_entries().len(), 2);
    /// ```
    pub fn transition<K: EntityKind, St: LifecycleStore>(
        &self,
        store: &mut St,
        actor: &Actor,
        request: TransitionRequest<K>,
    ) -> Result<TransitionOutcome<K>, ServiceError> {
        let gate = K::transition_permission(request.to);
        self.permissions.require(actor.role, gate).inspect_err(|err| {
            warn!(
                entity_type = K::ENTITY_TYPE,
                entity_id = %request.entity_id,
                to = request.to.name(),
                actor = %actor.id,
                error = %err,
                "transition rejected"
            );
        })?;

        if !K::accepts_direct_transition(request.to) {
            let err = ServiceError::DirectTransitionRefused {
                entity_type: K::ENTITY_TYPE,
                target: request.to.name(),
            };
            warn!(
                entity_type = K::ENTITY_TYPE,
                entity_id = %request.entity_id,
                actor = %actor.id,
                error = %err,
                "transition rejected"
            );
            return Err(err);
        }

        let record = store.load::<K>(&request.entity_id)?;
        self.apply(store, actor, record, &request, None)
    }

    /// Validate and commit a transition on an already loaded and gated
    /// record. `action` replaces the default audit action name.
    pub(crate) fn apply<K: EntityKind, St: LifecycleStore>(
        &self,
        store: &mut St,
        actor: &Actor,
        record: EntityRecord<K>,
        request: &TransitionRequest<K>,
        action: Option<String>,
    ) -> Result<TransitionOutcome<K>, ServiceError> {
        let from = record.state;
        let to = request.to;

        let has_override = request.override_requested
            && K::OVERRIDE_PERMISSION
                .is_some_and(|permission| self.permissions.has_permission(actor.role, permission));

        let validation = K::machine(self.lifecycles).validate(from, to, has_override);
        let rejected = |error: &ServiceError| {
            warn!(
                entity_type = K::ENTITY_TYPE,
                entity_id = %record.id,
                from = from.name(),
                to = to.name(),
                actor = %actor.id,
                error = %error,
                "transition rejected"
            );
        };

        if let Err(err) = validation.clone().into_result() {
            let err = ServiceError::from(err);
            rejected(&err);
            return Err(err);
        }

        let reason = request.reason();
        if validation.reason_required && reason.is_none() {
            let err = ServiceError::ReasonMissing { target: to.name() };
            rejected(&err);
            return Err(err);
        }

        let action = action.unwrap_or_else(|| {
            let kind = if validation.is_override_required {
                "override"
            } else {
                "status_change"
            };
            format!("{}.{kind}", K::ACTION_PREFIX)
        });

        let audit = NewAuditEntry {
            actor_id: actor.id.clone(),
            action,
            entity_type: K::ENTITY_TYPE.to_string(),
            entity_id: record.id.clone(),
            previous_state: Some(from.name().to_string()),
            new_state: to.name().to_string(),
            reason: reason.map(str::to_string),
            branch_id: record.branch_id.clone().or_else(|| actor.branch_id.clone()),
            context: BTreeMap::new(),
        };

        let expected_version = request.expected_version.unwrap_or(record.version);
        let entry = store
            .commit(TransitionCommit {
                entity_id: record.id.clone(),
                expected_version,
                to,
                audit,
            })
            .inspect_err(|err| {
                warn!(
                    entity_type = K::ENTITY_TYPE,
                    entity_id = %record.id,
                    error = %err,
                    "commit failed"
                );
            })?;

        info!(
            entity_type = K::ENTITY_TYPE,
            entity_id = %record.id,
            from = from.name(),
            to = to.name(),
            actor = %actor.id,
            is_override = validation.is_override_required,
            "transition committed"
        );

        Ok(TransitionOutcome {
            record: EntityRecord {
                state: to,
                version: expected_version + 1,
                ..record
            },
            audit: entry,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sample_entry;
    use crate::core::State;
    use crate::lifecycle::{ApprovalStatus, RentalStatus, TaskStatus, VehicleStatus};
    use crate::machine::TransitionError;
    use crate::permissions::{Permission, PermissionDenied};
    use crate::service::store::InMemoryStore;
    use crate::service::StoreError;
    use chrono::{Duration, Utc};

    struct Fixture {
        permissions: PermissionTable,
        lifecycles: Lifecycles,
        store: InMemoryStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                permissions: PermissionTable::standard(),
                lifecycles: Lifecycles::standard().unwrap(),
                store: InMemoryStore::new(),
            }
        }

        fn seed<K: EntityKind>(&mut self, id: &str) {
            let admin = Actor::new("admin", Role::Admin);
            TransitionService::new(&self.permissions, &self.lifecycles)
                .create(&mut self.store, &admin, EntityRecord::<K>::new(id).with_branch("north"))
                .unwrap();
        }

        fn transition<K: EntityKind>(
            &mut self,
            actor: &Actor,
            request: TransitionRequest<K>,
        ) -> Result<TransitionOutcome<K>, ServiceError> {
            TransitionService::new(&self.permissions, &self.lifecycles)
                .transition(&mut self.store, actor, request)
        }
    }

    fn agent() -> Actor {
        Actor::new("agent-1", Role::BranchAgent).with_branch("north")
    }

    #[test]
    fn create_records_initial_state_without_previous() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");

        let entries = fx.store.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "vehicle.create");
        assert_eq!(entries[0].previous_state, None);
        assert_eq!(entries[0].new_state, "AVAILABLE");
    }

    #[test]
    fn create_is_gated() {
        let mut fx = Fixture::new();
        let service = TransitionService::new(&fx.permissions, &fx.lifecycles);

        let err = service
            .create(&mut fx.store, &agent(), EntityRecord::<VehicleStatus>::new("v-1"))
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::PermissionDenied(PermissionDenied {
                role: Role::BranchAgent,
                permission: Permission::FleetWrite,
            })
        );
        assert!(fx.store.audit_entries().is_empty());
    }

    #[test]
    fn create_ignores_caller_supplied_state() {
        let mut fx = Fixture::new();
        let service = TransitionService::new(&fx.permissions, &fx.lifecycles);
        let mut record = EntityRecord::<TaskStatus>::new("t-1");
        record.state = TaskStatus::Completed;
        record.version = 9;

        service
            .create(&mut fx.store, &Actor::new("u", Role::BranchAgent), record)
            .unwrap();

        let stored = fx.store.load::<TaskStatus>("t-1").unwrap();
        assert_eq!(stored.state, TaskStatus::Pending);
        assert_eq!(stored.version, 0);
    }

    #[test]
    fn permission_is_checked_before_load() {
        let mut fx = Fixture::new();
        let auditor = Actor::new("aud", Role::Auditor);

        let err = fx
            .transition(
                &auditor,
                TransitionRequest::new("missing", VehicleStatus::ReservedPrepPending),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let mut fx = Fixture::new();
        let err = fx
            .transition(
                &agent(),
                TransitionRequest::new("missing", VehicleStatus::ReservedPrepPending),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(StoreError::NotFound { .. })));
    }

    #[test]
    fn legal_transition_commits_with_audit() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");

        let outcome = fx
            .transition(&agent(), TransitionRequest::new("v-1", VehicleStatus::ReservedPrepPending))
            .unwrap();

        assert_eq!(outcome.record.state, VehicleStatus::ReservedPrepPending);
        assert_eq!(outcome.record.version, 1);
        assert_eq!(outcome.audit.previous_state.as_deref(), Some("AVAILABLE"));
        assert_eq!(outcome.audit.new_state, "RESERVED_PREP_PENDING");
        assert_eq!(outcome.audit.branch_id.as_deref(), Some("north"));
        assert_eq!(fx.store.audit_entries().len(), 2);
    }

    #[test]
    fn illegal_transition_persists_nothing() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");

        let err = fx
            .transition(&agent(), TransitionRequest::new("v-1", VehicleStatus::OnRent))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Transition(TransitionError::InvalidTransition { .. })
        ));
        assert_eq!(fx.store.load::<VehicleStatus>("v-1").unwrap().version, 0);
        assert_eq!(fx.store.audit_entries().len(), 1);
    }

    #[test]
    fn blank_reason_counts_as_missing() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");

        let err = fx
            .transition(
                &agent(),
                TransitionRequest::new("v-1", VehicleStatus::OutOfService).with_reason("   "),
            )
            .unwrap_err();

        assert_eq!(err, ServiceError::ReasonMissing { target: "OUT_OF_SERVICE" });
        assert_eq!(fx.store.audit_entries().len(), 1);
    }

    #[test]
    fn reason_is_trimmed_into_audit() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");

        let outcome = fx
            .transition(
                &agent(),
                TransitionRequest::new("v-1", VehicleStatus::OutOfService)
                    .with_reason("  hail damage "),
            )
            .unwrap();

        assert_eq!(outcome.audit.reason.as_deref(), Some("hail damage"));
    }

    #[test]
    fn override_without_permission_is_ignored() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");
        let director = Actor::new("dir", Role::OperationsDirector);
        let reserved = fx
            .transition(&agent(), TransitionRequest::new("v-1", VehicleStatus::ReservedPrepPending))
            .unwrap();
        assert_eq!(reserved.record.version, 1);

        let denied = fx
            .transition(
                &agent(),
                TransitionRequest::new("v-1", VehicleStatus::MaintenancePending)
                    .with_override()
                    .with_reason("noise"),
            )
            .unwrap_err();
        assert!(matches!(denied, ServiceError::Transition(_)));

        let forced = fx
            .transition(
                &director,
                TransitionRequest::new("v-1", VehicleStatus::MaintenancePending)
                    .with_override()
                    .with_reason("noise"),
            )
            .unwrap();
        assert!(forced.validation.is_override_required);
        assert_eq!(forced.audit.action, "vehicle.override");
    }

    #[test]
    fn stale_expected_version_conflicts() {
        let mut fx = Fixture::new();
        fx.seed::<VehicleStatus>("v-1");
        fx.transition(&agent(), TransitionRequest::new("v-1", VehicleStatus::ReservedPrepPending))
            .unwrap();

        let err = fx
            .transition(
                &agent(),
                TransitionRequest::new("v-1", VehicleStatus::PickupReady).with_expected_version(0),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Store(StoreError::Conflict { expected: 0, found: 1, .. })
        ));
        assert_eq!(fx.store.audit_entries().len(), 2);
    }

    #[test]
    fn rental_cancellation_uses_cancel_permission() {
        let mut fx = Fixture::new();
        fx.seed::<RentalStatus>("r-1");

        let err = fx
            .transition(
                &agent(),
                TransitionRequest::new("r-1", RentalStatus::Cancelled)
                    .with_reason("customer request"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::PermissionDenied(PermissionDenied {
                role: Role::BranchAgent,
                permission: Permission::RentalCancel,
            })
        );

        let supervisor = Actor::new("sup", Role::ShiftSupervisor);
        let outcome = fx
            .transition(
                &supervisor,
                TransitionRequest::new("r-1", RentalStatus::Cancelled)
                    .with_reason("customer request"),
            )
            .unwrap();
        assert_eq!(outcome.audit.action, "rental.status_change");
    }

    #[test]
    fn cancelled_rental_cannot_be_overridden() {
        let mut fx = Fixture::new();
        fx.seed::<RentalStatus>("r-1");
        let admin = Actor::new("admin", Role::Admin);
        fx.transition(
            &admin,
            TransitionRequest::new("r-1", RentalStatus::Cancelled).with_reason("duplicate"),
        )
        .unwrap();

        let err = fx
            .transition(
                &admin,
                TransitionRequest::new("r-1", RentalStatus::Active)
                    .with_override()
                    .with_reason("reopen"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Transition(TransitionError::TerminalState { .. })
        ));
    }

    #[test]
    fn overdue_approval_cannot_be_decided_generically() {
        let mut fx = Fixture::new();
        let overdue = EntityRecord::<ApprovalStatus>::new("a-1")
            .with_expiry(Utc::now() - Duration::hours(47));
        fx.store
            .insert(overdue, sample_entry("approval.requested", "a-1"))
            .unwrap();
        let manager = Actor::new("mgr", Role::BranchManager);

        for to in [ApprovalStatus::Approved, ApprovalStatus::Denied] {
            let err = fx
                .transition(&manager, TransitionRequest::new("a-1", to).with_reason("looks fine"))
                .unwrap_err();
            assert_eq!(
                err,
                ServiceError::DirectTransitionRefused {
                    entity_type: "ApprovalRequest",
                    target: to.name(),
                }
            );
        }

        let record = fx.store.load::<ApprovalStatus>("a-1").unwrap();
        assert_eq!(record.state, ApprovalStatus::Pending);
        assert_eq!(record.version, 0);
        assert_eq!(fx.store.audit_entries().len(), 1);
    }

    #[test]
    fn approval_can_still_be_escalated_generically() {
        let mut fx = Fixture::new();
        fx.store
            .insert(
                EntityRecord::<ApprovalStatus>::new("a-1"),
                sample_entry("approval.requested", "a-1"),
            )
            .unwrap();

        let outcome = fx
            .transition(
                &Actor::new("mgr", Role::BranchManager),
                TransitionRequest::new("a-1", ApprovalStatus::Escalated),
            )
            .unwrap();
        assert_eq!(outcome.audit.action, "approval.status_change");
    }

    #[test]
    fn approvals_are_not_created_generically() {
        let mut fx = Fixture::new();
        let service = TransitionService::new(&fx.permissions, &fx.lifecycles);

        let err = service
            .create(&mut fx.store, &agent(), EntityRecord::<ApprovalStatus>::new("a-1"))
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::DirectTransitionRefused {
                entity_type: "ApprovalRequest",
                target: "PENDING",
            }
        );
        assert!(fx.store.audit_entries().is_empty());
    }
}
