//! Approval requests with time-boxed decisions.

use crate::audit::AuditEntry;
use crate::config::ApprovalPolicy;
use crate::core::State;
use crate::lifecycle::{ApprovalStatus, EntityKind};
use crate::service::error::ServiceError;
use crate::service::store::{EntityRecord, LifecycleStore};
use crate::service::transition::{Actor, TransitionOutcome, TransitionRequest, TransitionService};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What kind of exception an approval request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    Refund,
    DepositWaiver,
    FeeWaiver,
    DamageWriteOff,
    StatusOverride,
}

impl ApprovalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refund => "REFUND",
            Self::DepositWaiver => "DEPOSIT_WAIVER",
            Self::FeeWaiver => "FEE_WAIVER",
            Self::DamageWriteOff => "DAMAGE_WRITE_OFF",
            Self::StatusOverride => "STATUS_OVERRIDE",
        }
    }
}

/// The two outcomes a decider can choose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Denied,
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApprovalStatus::Approved,
            Decision::Denied => ApprovalStatus::Denied,
        }
    }
}

/// Parameters for opening an approval request.
#[derive(Clone, Debug, PartialEq)]
pub struct NewApproval {
    pub id: String,
    pub approval_type: ApprovalType,
    /// Kind of the entity the request is about, e.g. `Payment`.
    pub target_entity_type: String,
    pub target_entity_id: String,
    /// Why the exception is needed. Must not be blank.
    pub reason: String,
    /// Type-specific data handed to whoever acts on the approval.
    pub payload: Map<String, Value>,
    pub branch_id: Option<String>,
    /// Hours until the request expires; falls back to the policy default.
    pub expires_in_hours: Option<u32>,
}

impl NewApproval {
    pub fn new(
        id: impl Into<String>,
        approval_type: ApprovalType,
        target_entity_type: impl Into<String>,
        target_entity_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            approval_type,
            target_entity_type: target_entity_type.into(),
            target_entity_id: target_entity_id.into(),
            reason: reason.into(),
            payload: Map::new(),
            branch_id: None,
            expires_in_hours: None,
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn expires_in(mut self, hours: u32) -> Self {
        self.expires_in_hours = Some(hours);
        self
    }
}

/// What a stored approval request asks for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalDetails {
    pub approval_type: ApprovalType,
    pub target_entity_type: String,
    pub target_entity_id: String,
    pub requester_id: String,
    pub reason: String,
    pub payload: Map<String, Value>,
}

/// Opens and decides approval requests.
///
/// Expiry is checked against the `now` passed in by the caller. A decision
/// on an overdue request moves it to EXPIRED (with its own audit entry) and
/// is itself refused.
#[derive(Clone, Copy, Debug)]
pub struct ApprovalService<'a> {
    transitions: TransitionService<'a>,
    policy: &'a ApprovalPolicy,
}

impl<'a> ApprovalService<'a> {
    pub fn new(transitions: TransitionService<'a>, policy: &'a ApprovalPolicy) -> Self {
        Self { transitions, policy }
    }

    /// Open a PENDING request. Any authenticated actor may do this.
    ///
    /// The creation entry carries the reason, and its context names the
    /// approval type and target.
    pub fn request<St: LifecycleStore>(
        &self,
        store: &mut St,
        actor: &Actor,
        new: NewApproval,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, ServiceError> {
        let reason = new.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::ReasonMissing {
                target: ApprovalStatus::INITIAL.name(),
            });
        }

        let hours = new.expires_in_hours.or(self.policy.default_expiry_hours);
        let max = self.policy.max_expiry_hours;
        if let Some(hours) = hours.filter(|h| !(1..=max).contains(h)) {
            return Err(ServiceError::InvalidExpiry { hours, max });
        }

        let mut record = EntityRecord::<ApprovalStatus>::new(new.id);
        record.branch_id = new.branch_id;
        record.expires_at = hours.map(|h| now + Duration::hours(i64::from(h)));

        let mut audit =
            TransitionService::creation_entry(actor, &record, "approval.requested".to_string());
        audit.reason = Some(reason.to_string());
        audit.context = BTreeMap::from([
            ("approval_type".to_string(), new.approval_type.as_str().to_string()),
            ("target_entity_type".to_string(), new.target_entity_type.clone()),
            ("target_entity_id".to_string(), new.target_entity_id.clone()),
        ]);

        let details = ApprovalDetails {
            approval_type: new.approval_type,
            target_entity_type: new.target_entity_type,
            target_entity_id: new.target_entity_id,
            requester_id: actor.id.clone(),
            reason: reason.to_string(),
            payload: new.payload,
        };

        let entity_id = record.id.clone();
        let entry = store.insert_approval(record, details, audit)?;
        info!(
            entity_id = %entity_id,
            approval_type = new.approval_type.as_str(),
            actor = %actor.id,
            "approval requested"
        );
        Ok(entry)
    }

    /// Record a decision.
    ///
    /// `notes` become the audit reason; a denial without notes is refused.
    pub fn decide<St: LifecycleStore>(
        &self,
        store: &mut St,
        actor: &Actor,
        entity_id: &str,
        decision: Decision,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome<ApprovalStatus>, ServiceError> {
        let to = ApprovalStatus::from(decision);
        self.transitions
            .permissions()
            .require(actor.role, ApprovalStatus::transition_permission(to))?;

        let record = store.load::<ApprovalStatus>(entity_id)?;
        self.transitions
            .lifecycles()
            .approval()
            .validate(record.state, to, false)
            .into_result()?;

        if let Some(expired_at) = record.expires_at.filter(|at| now > *at) {
            let expire = TransitionRequest::new(entity_id, ApprovalStatus::Expired);
            self.transitions.apply(
                store,
                actor,
                record,
                &expire,
                Some("approval.expired".to_string()),
            )?;
            warn!(entity_id, %expired_at, actor = %actor.id, "decision on expired approval");
            return Err(ServiceError::Expired {
                entity_id: entity_id.to_string(),
                expired_at,
            });
        }

        let mut request = TransitionRequest::new(entity_id, to);
        request.reason = notes;
        let action = format!("approval.{}", to.name().to_lowercase());
        let outcome = self.transitions.apply(store, actor, record, &request, Some(action))?;
        info!(entity_id, decision = to.name(), actor = %actor.id, "approval decided");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Lifecycles;
    use crate::machine::TransitionError;
    use crate::permissions::{Permission, PermissionTable, Role};
    use crate::service::store::InMemoryStore;
    use serde_json::json;

    struct Fixture {
        permissions: PermissionTable,
        lifecycles: Lifecycles,
        policy: ApprovalPolicy,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                permissions: PermissionTable::standard(),
                lifecycles: Lifecycles::standard().unwrap(),
                policy: ApprovalPolicy::default(),
            }
        }

        fn service(&self) -> ApprovalService<'_> {
            ApprovalService::new(
                TransitionService::new(&self.permissions, &self.lifecycles),
                &self.policy,
            )
        }
    }

    fn refund(id: &str) -> NewApproval {
        NewApproval::new(id, ApprovalType::Refund, "Payment", "pay-9", "double charge at pickup")
    }

    fn requester() -> Actor {
        Actor::new("agent", Role::BranchAgent).with_branch("north")
    }

    fn manager() -> Actor {
        Actor::new("mgr", Role::BranchManager)
    }

    #[test]
    fn anyone_can_open_a_request() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        let entry = service
            .request(&mut store, &requester(), refund("a-1").expires_in(24), now)
            .unwrap();

        assert_eq!(entry.action, "approval.requested");
        assert_eq!(entry.new_state, "PENDING");
        assert_eq!(entry.branch_id.as_deref(), Some("north"));

        let record = store.load::<ApprovalStatus>("a-1").unwrap();
        assert_eq!(record.expires_at, Some(now + Duration::hours(24)));
    }

    #[test]
    fn request_records_type_target_and_reason() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let payload = json!({ "amount": 120, "currency": "EUR" });
        let new = refund("a-1").with_payload(payload.as_object().unwrap().clone());

        let entry = fx
            .service()
            .request(&mut store, &requester(), new, Utc::now())
            .unwrap();

        assert_eq!(entry.reason.as_deref(), Some("double charge at pickup"));
        assert_eq!(entry.context["approval_type"], "REFUND");
        assert_eq!(entry.context["target_entity_type"], "Payment");
        assert_eq!(entry.context["target_entity_id"], "pay-9");

        let details = store.approval_details("a-1").unwrap();
        assert_eq!(details.approval_type, ApprovalType::Refund);
        assert_eq!(details.target_entity_id, "pay-9");
        assert_eq!(details.requester_id, "agent");
        assert_eq!(details.payload["amount"], json!(120));
    }

    #[test]
    fn blank_reason_is_rejected() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let new = NewApproval::new("a-1", ApprovalType::FeeWaiver, "Rental", "r-1", "  \t ");

        let err = fx
            .service()
            .request(&mut store, &requester(), new, Utc::now())
            .unwrap_err();

        assert_eq!(err, ServiceError::ReasonMissing { target: "PENDING" });
        assert!(store.audit_entries().is_empty());
        assert!(store.load::<ApprovalStatus>("a-1").is_err());
    }

    #[test]
    fn expiry_outside_bounds_is_rejected() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let service = fx.service();

        for hours in [0, 169] {
            let err = service
                .request(&mut store, &requester(), refund("a-1").expires_in(hours), Utc::now())
                .unwrap_err();
            assert_eq!(err, ServiceError::InvalidExpiry { hours, max: 168 });
        }
        assert!(store.audit_entries().is_empty());
    }

    #[test]
    fn policy_default_expiry_applies() {
        let mut fx = Fixture::new();
        let mut store = InMemoryStore::new();
        fx.policy.default_expiry_hours = Some(2);
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1"), now)
            .unwrap();

        let record = store.load::<ApprovalStatus>("a-1").unwrap();
        assert_eq!(record.expires_at, Some(now + Duration::hours(2)));
    }

    #[test]
    fn approval_within_window_commits() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1").expires_in(1), now)
            .unwrap();

        let outcome = service
            .decide(
                &mut store,
                &manager(),
                "a-1",
                Decision::Approved,
                None,
                now + Duration::minutes(30),
            )
            .unwrap();

        assert_eq!(outcome.record.state, ApprovalStatus::Approved);
        assert_eq!(outcome.audit.action, "approval.approved");
    }

    #[test]
    fn overdue_decision_expires_request() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1").expires_in(1), now)
            .unwrap();

        let err = service
            .decide(
                &mut store,
                &manager(),
                "a-1",
                Decision::Approved,
                None,
                now + Duration::hours(2),
            )
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Expired {
                entity_id: "a-1".to_string(),
                expired_at: now + Duration::hours(1),
            }
        );
        let record = store.load::<ApprovalStatus>("a-1").unwrap();
        assert_eq!(record.state, ApprovalStatus::Expired);

        let last = store.audit_entries().last().unwrap();
        assert_eq!(last.action, "approval.expired");
        assert_eq!(last.previous_state.as_deref(), Some("PENDING"));
    }

    #[test]
    fn decided_request_cannot_be_decided_again() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1"), now)
            .unwrap();
        service
            .decide(&mut store, &manager(), "a-1", Decision::Approved, None, now)
            .unwrap();

        let err = service
            .decide(&mut store, &manager(), "a-1", Decision::Denied, Some("late".into()), now)
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Transition(TransitionError::TerminalState { .. })
        ));
    }

    #[test]
    fn denial_needs_notes() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1"), now)
            .unwrap();

        let err = service
            .decide(&mut store, &manager(), "a-1", Decision::Denied, None, now)
            .unwrap_err();
        assert_eq!(err, ServiceError::ReasonMissing { target: ApprovalStatus::Denied.name() });

        let outcome = service
            .decide(
                &mut store,
                &manager(),
                "a-1",
                Decision::Denied,
                Some("over budget".into()),
                now,
            )
            .unwrap();
        assert_eq!(outcome.audit.action, "approval.denied");
        assert_eq!(outcome.audit.reason.as_deref(), Some("over budget"));
    }

    #[test]
    fn deciding_requires_permission() {
        let fx = Fixture::new();
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let service = fx.service();
        service
            .request(&mut store, &requester(), refund("a-1"), now)
            .unwrap();

        let err = service
            .decide(&mut store, &requester(), "a-1", Decision::Approved, None, now)
            .unwrap_err();
        let ServiceError::PermissionDenied(denied) = &err else {
            panic!("expected permission denial, got {err:?}");
        };
        assert_eq!(denied.permission, Permission::ApprovalDecide);
    }
}
