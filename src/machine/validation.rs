//! The result of validating one proposed transition.

use crate::core::State;
use crate::machine::error::TransitionError;
use serde::Serialize;

/// Why a transition was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The source state is terminal.
    Terminal,
    /// There is no edge from the source to the target.
    NotAnEdge,
}

/// Outcome of [`StateMachine::validate`](crate::machine::StateMachine::validate).
///
/// A validation is a plain value: producing it has no side effects, and the
/// same inputs always yield an equal value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct TransitionValidation<S: State> {
    /// Display name of the machine that produced this result
    pub machine: &'static str,
    pub valid: bool,
    pub from: S,
    pub to: S,
    /// Human-readable explanation when `valid` is false
    pub reason: Option<String>,
    /// Direct edges out of `from`; override targets are not included
    pub allowed_transitions: Vec<S>,
    /// The transition is only valid because an override was applied
    pub is_override_required: bool,
    /// The caller must collect a justification before persisting
    pub reason_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl<S: State> TransitionValidation<S> {
    /// Convert into a `Result`, turning a rejection into a typed error.
    pub fn into_result(self) -> Result<Self, TransitionError> {
        match self.rejection {
            None => Ok(self),
            Some(Rejection::Terminal) => Err(TransitionError::TerminalState {
                machine: self.machine,
                from: self.from.name(),
                to: self.to.name(),
            }),
            Some(Rejection::NotAnEdge) => Err(TransitionError::InvalidTransition {
                machine: self.machine,
                from: self.from.name(),
                to: self.to.name(),
                allowed: self.allowed_transitions.iter().map(State::name).collect(),
            }),
        }
    }
}
