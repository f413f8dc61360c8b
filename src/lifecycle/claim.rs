//! Insurance claim lifecycle.

use crate::lifecycle::{EntityKind, Lifecycles};
use crate::machine::{BuildError, StateMachine};
use crate::permissions::Permission;

crate::state_enum! {
    pub enum ClaimStatus as "ClaimStatus" {
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        UnderReview => "UNDER_REVIEW",
        NeedsInfo => "NEEDS_INFO",
        Approved => "APPROVED",
        Denied => "DENIED",
        Appeal => "APPEAL",
        Settled => "SETTLED",
        Closed => "CLOSED",
    }
}

pub fn machine() -> Result<StateMachine<ClaimStatus>, BuildError> {
    use ClaimStatus::*;

    StateMachine::builder()
        .transitions(Draft, [Submitted])
        .transitions(Submitted, [UnderReview])
        .transitions(UnderReview, [Approved, Denied, NeedsInfo])
        .transitions(NeedsInfo, [Submitted])
        .transitions(Approved, [Settled])
        .transitions(Denied, [Appeal, Closed])
        .transitions(Appeal, [UnderReview])
        .transitions(Settled, [Closed])
        .transitions(Closed, [])
        .terminal([Closed])
        .requires_reason([Denied])
        .build()
}

impl EntityKind for ClaimStatus {
    const ENTITY_TYPE: &'static str = "Claim";
    const ACTION_PREFIX: &'static str = "claim";
    const INITIAL: Self = ClaimStatus::Draft;
    const CREATE_PERMISSION: Option<Permission> = Some(Permission::ClaimsManage);

    fn transition_permission(_to: Self) -> Permission {
        Permission::ClaimsManage
    }

    fn machine(lifecycles: &Lifecycles) -> &StateMachine<Self> {
        lifecycles.claim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_claim_can_be_appealed_back_into_review() {
        let machine = machine().unwrap();
        assert!(machine.validate(ClaimStatus::Denied, ClaimStatus::Appeal, false).valid);
        assert!(machine.validate(ClaimStatus::Appeal, ClaimStatus::UnderReview, false).valid);
    }

    #[test]
    fn denial_needs_reason() {
        let result = machine()
            .unwrap()
            .validate(ClaimStatus::UnderReview, ClaimStatus::Denied, false);
        assert!(result.reason_required);
    }

    #[test]
    fn every_claim_can_eventually_close() {
        let machine = machine().unwrap();
        for state in [
            ClaimStatus::Draft,
            ClaimStatus::NeedsInfo,
            ClaimStatus::Appeal,
            ClaimStatus::Approved,
        ] {
            assert!(machine.is_reachable(state, ClaimStatus::Closed));
        }
    }
}
