//! Builder for constructing validated state machines.

use crate::core::State;
use crate::machine::error::{BuildError, ConfigProblem};
use crate::machine::StateMachine;
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigProblem>>;

/// Builder for constructing state machines with a fluent API.
///
/// Every state of `S` must receive exactly one transition row (possibly
/// empty). `build` reports all configuration problems together.
///
/// # Example
///
/// ```
/// use fleet_lifecycle::machine::StateMachineBuilder;
/// use fleet_lifecycle::state_enum;
///
/// state_enum! {
///     enum Door as "DoorStatus" {
///         Open => "OPEN",
///         Closed => "CLOSED",
///         Welded => "WELDED",
///     }
/// }
///
/// let machine = StateMachineBuilder::new()
///     .transitions(Door::Open, [Door::Closed])
///     .transitions(Door::Closed, [Door::Open, Door::Welded])
///     .transitions(Door::Welded, [])
///     .terminal([Door::Welded])
///     .requires_reason([Door::Welded])
///     .build()
///     .unwrap();
///
/// assert!(machine.validate(Door::Closed, Door::Welded, false).reason_required);
/// ```
pub struct StateMachineBuilder<S: State> {
    rows: Vec<(S, Vec<S>)>,
    terminal: HashSet<S>,
    requires_reason: HashSet<S>,
    override_allowed: HashSet<S>,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            terminal: HashSet::new(),
            requires_reason: HashSet::new(),
            override_allowed: HashSet::new(),
        }
    }

    /// Declare the direct edges out of `from`.
    pub fn transitions(mut self, from: S, to: impl IntoIterator<Item = S>) -> Self {
        self.rows.push((from, to.into_iter().collect()));
        self
    }

    /// Mark states that cannot be left without an override.
    pub fn terminal(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.terminal.extend(states);
        self
    }

    /// Mark target states that need a justification.
    pub fn requires_reason(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.requires_reason.extend(states);
        self
    }

    /// Mark target states reachable from anywhere by an override.
    pub fn override_allowed(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.override_allowed.extend(states);
        self
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        let mut seen: HashSet<S> = HashSet::new();
        let mut checks: Vec<Check> = Vec::new();

        for (from, to) in &self.rows {
            if !seen.insert(*from) {
                checks.push(Validation::fail(ConfigProblem::DuplicateRow {
                    state: from.name(),
                }));
            }
            if self.terminal.contains(from) && !to.is_empty() {
                checks.push(Validation::fail(ConfigProblem::TerminalHasEdges {
                    state: from.name(),
                }));
            }
        }

        for state in S::all() {
            let check = if seen.contains(state) {
                Validation::success(())
            } else {
                Validation::fail(ConfigProblem::MissingRow {
                    state: state.name(),
                })
            };
            checks.push(check);
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => {
                let transitions: HashMap<S, Vec<S>> = self.rows.into_iter().collect();
                Ok(StateMachine {
                    transitions,
                    terminal: self.terminal,
                    requires_reason: self.requires_reason,
                    override_allowed: self.override_allowed,
                })
            }
            Validation::Failure(problems) => Err(BuildError {
                machine: S::MACHINE,
                problems: problems.iter().cloned().collect(),
            }),
        }
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::state_enum! {
        enum TestState as "TestStatus" {
            Initial => "INITIAL",
            Processing => "PROCESSING",
            Complete => "COMPLETE",
        }
    }

    #[test]
    fn builder_requires_a_row_for_every_state() {
        let err = StateMachineBuilder::new()
            .transitions(TestState::Initial, [TestState::Processing])
            .build()
            .unwrap_err();

        assert_eq!(err.machine, "TestStatus");
        assert_eq!(
            err.problems,
            vec![
                ConfigProblem::MissingRow { state: "PROCESSING" },
                ConfigProblem::MissingRow { state: "COMPLETE" },
            ]
        );
    }

    #[test]
    fn builder_accumulates_all_problems() {
        let err = StateMachineBuilder::new()
            .transitions(TestState::Initial, [TestState::Processing])
            .transitions(TestState::Initial, [TestState::Complete])
            .transitions(TestState::Complete, [TestState::Initial])
            .terminal([TestState::Complete])
            .build()
            .unwrap_err();

        assert_eq!(err.problems.len(), 3);
        assert!(err
            .problems
            .contains(&ConfigProblem::DuplicateRow { state: "INITIAL" }));
        assert!(err
            .problems
            .contains(&ConfigProblem::TerminalHasEdges { state: "COMPLETE" }));
        assert!(err
            .problems
            .contains(&ConfigProblem::MissingRow { state: "PROCESSING" }));
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = StateMachineBuilder::new()
            .transitions(TestState::Initial, [TestState::Processing])
            .transitions(TestState::Processing, [TestState::Complete])
            .transitions(TestState::Complete, [])
            .terminal([TestState::Complete])
            .build()
            .unwrap();

        assert_eq!(machine.name(), "TestStatus");
        assert!(machine.is_terminal(TestState::Complete));
        assert_eq!(
            machine.allowed_transitions(TestState::Initial),
            &[TestState::Processing]
        );
    }
}
