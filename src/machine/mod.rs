//! Generic transition validator.
//!
//! A [`StateMachine`] is a static, immutable description of one entity
//! kind's lifecycle: the direct transition graph, the terminal states, the
//! targets that need a reason, and the targets an override may force. It
//! never touches storage; callers load the current state, ask the machine,
//! and persist only when the answer is valid.
//!
//! # Example
//!
//! ```
//! use fleet_lifecycle::lifecycle::{Lifecycles, VehicleStatus};
//!
//! let lifecycles = Lifecycles::standard().unwrap();
//! let vehicles = lifecycles.vehicle();
//!
//! let check = vehicles.validate(VehicleStatus::PickupReady, VehicleStatus::OnRent, false);
//! assert!(check.valid);
//! assert!(!check.reason_required);
//!
//! let check = vehicles.validate(VehicleStatus::Available, VehicleStatus::OnRent, false);
//! assert!(!check.valid);
//! ```

mod builder;
mod error;
mod validation;

pub use builder::StateMachineBuilder;
pub use error::{BuildError, ConfigProblem, TransitionError};
pub use validation::{Rejection, TransitionValidation};

use crate::core::State;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

/// Validated, immutable lifecycle configuration for one state enumeration.
///
/// Construct through [`StateMachineBuilder`]; the builder guarantees every
/// state has a transition row and no terminal state has outgoing edges.
#[derive(Clone, Debug)]
pub struct StateMachine<S: State> {
    pub(crate) transitions: HashMap<S, Vec<S>>,
    pub(crate) terminal: HashSet<S>,
    pub(crate) requires_reason: HashSet<S>,
    pub(crate) override_allowed: HashSet<S>,
}

impl<S: State> StateMachine<S> {
    /// Start a builder for this state enumeration.
    pub fn builder() -> StateMachineBuilder<S> {
        StateMachineBuilder::new()
    }

    /// Display name, e.g. `VehicleStatus`.
    pub fn name(&self) -> &'static str {
        S::MACHINE
    }

    /// Every state of the enumeration.
    pub fn states(&self) -> &'static [S] {
        S::all()
    }

    /// Validate a proposed transition.
    ///
    /// A direct edge is always valid, needing a reason only when `to` is a
    /// reason-required target. Without an edge, the transition is valid only
    /// when `has_override` is set and `to` is an override target; such
    /// transitions always need a reason. Anything else is rejected, with the
    /// message distinguishing a terminal source from a missing edge.
    pub fn validate(&self, from: S, to: S, has_override: bool) -> TransitionValidation<S> {
        let allowed = self.allowed_transitions(from).to_vec();

        let (valid, is_override_required, reason_required, rejection) = if allowed.contains(&to) {
            (true, false, self.requires_reason.contains(&to), None)
        } else if has_override && self.override_allowed.contains(&to) {
            (true, true, true, None)
        } else if self.is_terminal(from) {
            (false, false, false, Some(Rejection::Terminal))
        } else {
            (false, false, false, Some(Rejection::NotAnEdge))
        };

        let mut validation = TransitionValidation {
            machine: self.name(),
            valid,
            from,
            to,
            reason: None,
            allowed_transitions: allowed,
            is_override_required,
            reason_required,
            rejection,
        };

        if let Err(err) = validation.clone().into_result() {
            validation.reason = Some(err.to_string());
        }

        trace!(
            machine = self.name(),
            from = from.name(),
            to = to.name(),
            has_override,
            valid,
            "validated transition"
        );

        validation
    }

    /// Direct edges out of `from`. Override targets are not included.
    pub fn allowed_transitions(&self, from: S) -> &[S] {
        self.transitions
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_terminal(&self, state: S) -> bool {
        self.terminal.contains(&state)
    }

    pub fn requires_reason(&self, to: S) -> bool {
        self.requires_reason.contains(&to)
    }

    pub fn is_override_allowed(&self, to: S) -> bool {
        self.override_allowed.contains(&to)
    }

    /// Whether `to` can be reached from `from` through direct edges alone.
    ///
    /// A state always reaches itself.
    pub fn is_reachable(&self, from: S, to: S) -> bool {
        let mut visited: HashSet<S> = HashSet::from([from]);
        let mut queue: VecDeque<S> = VecDeque::from([from]);

        while let Some(state) = queue.pop_front() {
            if state == to {
                return true;
            }
            for next in self.allowed_transitions(state) {
                if visited.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }

        false
    }
}
