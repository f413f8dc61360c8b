//! Tool registry error types.

use thiserror::Error;

/// One defect in a tool registry definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryProblem {
    #[error("tool {name} registered twice")]
    DuplicateTool { name: String },

    #[error("slash command /{command} registered twice")]
    DuplicateCommand { command: String },

    #[error("slash command /{command} points at unknown tool {tool}")]
    UnknownTool { command: String, tool: String },
}

/// A tool registry failed to build. Carries every problem found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid tool registry: {}", join_problems(.problems))]
pub struct RegistryError {
    pub problems: Vec<RegistryProblem>,
}

fn join_problems(problems: &[RegistryProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
