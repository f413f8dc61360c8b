//! Errors raised while building machines and validating transitions.

use thiserror::Error;

/// A single problem found in a machine's configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigProblem {
    #[error("state {state} has no transition row")]
    MissingRow { state: &'static str },

    #[error("state {state} declares its transition row more than once")]
    DuplicateRow { state: &'static str },

    #[error("terminal state {state} declares outgoing transitions")]
    TerminalHasEdges { state: &'static str },
}

/// A machine configuration was rejected. Carries every problem found, not
/// just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {machine} configuration: {}", join_problems(.problems))]
pub struct BuildError {
    pub machine: &'static str,
    pub problems: Vec<ConfigProblem>,
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A proposed transition is not allowed by the machine.
///
/// The display text is what the caller surfaces to the actor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{from} is a terminal state in {machine}. Admin override required.")]
    TerminalState {
        machine: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid {machine} transition: {from} → {to}. Allowed: {}", join_allowed(.allowed))]
    InvalidTransition {
        machine: &'static str,
        from: &'static str,
        to: &'static str,
        allowed: Vec<&'static str>,
    },
}

fn join_allowed(allowed: &[&'static str]) -> String {
    if allowed.is_empty() {
        "none".to_string()
    } else {
        allowed.join(", ")
    }
}
