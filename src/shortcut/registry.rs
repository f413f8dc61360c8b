//! Immutable catalogue of read-only tools and their slash commands.

use crate::permissions::{Permission, PermissionTable, Role};
use crate::shortcut::error::{RegistryError, RegistryProblem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<RegistryProblem>>;

/// Description of a tool. Execution lives outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub required_permission: Permission,
    pub is_write_action: bool,
}

impl ToolDefinition {
    /// A read-only tool.
    pub fn read_only(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        required_permission: Permission,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            category: category.into(),
            required_permission,
            is_write_action: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    /// Command word without the leading slash, lowercase.
    pub command: String,
    pub tool_name: String,
    pub description: String,
    pub usage: String,
}

/// Result of parsing `/command arg key=value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub tool_name: String,
    /// Positional words are keyed `arg{N}` by their position among all
    /// words after the command; `key=value` words are keyed by `key`.
    pub args: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDefinition>,
    commands: Vec<SlashCommand>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    /// Register a tool together with a slash command that invokes it.
    pub fn tool_with_command(
        mut self,
        tool: ToolDefinition,
        command: &str,
        description: &str,
        usage: &str,
    ) -> Self {
        self.commands.push(SlashCommand {
            command: command.to_lowercase(),
            tool_name: tool.name.clone(),
            description: description.to_string(),
            usage: usage.to_string(),
        });
        self.tools.push(tool);
        self
    }

    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut checks: Vec<Check> = Vec::new();
        let mut names: HashSet<&str> = HashSet::new();
        let mut words: HashSet<&str> = HashSet::new();

        for tool in &self.tools {
            if !names.insert(&tool.name) {
                checks.push(Validation::fail(RegistryProblem::DuplicateTool {
                    name: tool.name.clone(),
                }));
            }
        }
        for command in &self.commands {
            if !words.insert(&command.command) {
                checks.push(Validation::fail(RegistryProblem::DuplicateCommand {
                    command: command.command.clone(),
                }));
            }
            if !names.contains(command.tool_name.as_str()) {
                checks.push(Validation::fail(RegistryProblem::UnknownTool {
                    command: command.command.clone(),
                    tool: command.tool_name.clone(),
                }));
            }
        }

        if let Validation::Failure(problems) = Validation::all_vec(checks) {
            return Err(RegistryError {
                problems: problems.iter().cloned().collect(),
            });
        }

        let index = self
            .tools
            .iter()
            .enumerate()
            .map(|(i, tool)| (tool.name.clone(), i))
            .collect();

        Ok(ToolRegistry {
            tools: self.tools,
            index,
            commands: self.commands,
        })
    }
}

/// Read-only after construction; pass by reference.
#[derive(Clone, Debug)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
    commands: Vec<SlashCommand>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// The six built-in read tools.
    #[rustfmt::skip]
    pub fn standard() -> Result<Self, RegistryError> {
        Self::builder()
            .tool_with_command(
                ToolDefinition::read_only("fleet.list", "List Vehicles", "Show fleet vehicles with optional filters", "fleet", Permission::FleetRead),
                "fleet", "List fleet vehicles", "/fleet [status] [search=...]",
            )
            .tool_with_command(
                ToolDefinition::read_only("fleet.stats", "Fleet Summary", "Fleet status breakdown", "fleet", Permission::FleetRead),
                "fleet-stats", "Fleet status summary", "/fleet-stats",
            )
            .tool_with_command(
                ToolDefinition::read_only("task.list", "List Tasks", "Show tasks with optional priority/status filter", "task", Permission::TaskRead),
                "tasks", "List tasks", "/tasks [status|priority]",
            )
            .tool_with_command(
                ToolDefinition::read_only("incident.list", "List Incidents", "Show open incidents", "incident", Permission::IncidentRead),
                "incidents", "List open incidents", "/incidents [severity]",
            )
            .tool_with_command(
                ToolDefinition::read_only("finance.summary", "Finance Summary", "Revenue and payment overview", "finance", Permission::FinanceRead),
                "finance", "Finance overview", "/finance",
            )
            .tool_with_command(
                ToolDefinition::read_only("rentals.active", "Active Rentals", "Show currently active rentals", "rental", Permission::RentalRead),
                "rentals", "Active rentals", "/rentals",
            )
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|i| &self.tools[*i])
    }

    /// Every tool, in registration order.
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn slash_commands(&self) -> &[SlashCommand] {
        &self.commands
    }

    /// Tools whose permission `role` holds.
    pub fn tools_for(&self, permissions: &PermissionTable, role: Role) -> Vec<&ToolDefinition> {
        self.tools
            .iter()
            .filter(|tool| permissions.has_permission(role, tool.required_permission))
            .collect()
    }

    /// Slash commands whose tool `role` may use.
    pub fn slash_commands_for(
        &self,
        permissions: &PermissionTable,
        role: Role,
    ) -> Vec<&SlashCommand> {
        self.commands
            .iter()
            .filter(|command| {
                self.get(&command.tool_name)
                    .is_some_and(|tool| permissions.has_permission(role, tool.required_permission))
            })
            .collect()
    }

    /// Resolve `/command words...` to a tool and its arguments.
    ///
    /// Returns `None` for input that is not a slash command or names an
    /// unregistered command.
    ///
    /// ```
    /// use fleet_lifecycle::shortcut::ToolRegistry;
    ///
    /// let registry = ToolRegistry::standard().unwrap();
    /// let parsed = registry.parse_slash_command("/Fleet AVAILABLE search=civic").unwrap();
    ///
    /// assert_eq!(parsed.tool_name, "fleet.list");
    /// assert_eq!(parsed.args["arg0"], "AVAILABLE");
    /// assert_eq!(parsed.args["search"], "civic");
    /// ```
    pub fn parse_slash_command(&self, input: &str) -> Option<ParsedCommand> {
        let rest = input.trim().strip_prefix('/')?;
        let mut words = rest.split_whitespace();
        let command = words.next()?.to_lowercase();
        let slash = self.commands.iter().find(|c| c.command == command)?;

        let args = words
            .enumerate()
            .map(|(i, word)| match word.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (format!("arg{i}"), word.to_string()),
            })
            .collect();

        Some(ParsedCommand {
            tool_name: slash.tool_name.clone(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        ToolRegistry::standard().unwrap()
    }

    #[test]
    fn standard_registry_holds_six_read_tools() {
        let registry = registry();
        assert_eq!(registry.tools().len(), 6);
        assert_eq!(registry.slash_commands().len(), 6);
        assert!(registry.tools().iter().all(|t| !t.is_write_action));
        assert_eq!(
            registry.get("rentals.active").map(|t| t.required_permission),
            Some(Permission::RentalRead)
        );
        assert!(registry.get("fleet.delete").is_none());
    }

    #[test]
    fn tools_are_filtered_by_role() {
        let registry = registry();
        let table = PermissionTable::standard();

        let names: Vec<&str> = registry
            .tools_for(&table, Role::FinanceStaff)
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["fleet.list", "fleet.stats", "task.list", "finance.summary", "rentals.active"]
        );

        let commands: Vec<&str> = registry
            .slash_commands_for(&table, Role::FleetCoordinator)
            .into_iter()
            .map(|c| c.command.as_str())
            .collect();
        assert_eq!(commands, vec!["fleet", "fleet-stats", "tasks", "incidents", "rentals"]);
    }

    #[test]
    fn positional_index_counts_every_word() {
        let parsed = registry()
            .parse_slash_command("  /tasks open priority=high urgent ")
            .unwrap();

        assert_eq!(parsed.tool_name, "task.list");
        assert_eq!(parsed.args.get("arg0").map(String::as_str), Some("open"));
        assert_eq!(parsed.args.get("priority").map(String::as_str), Some("high"));
        assert_eq!(parsed.args.get("arg2").map(String::as_str), Some("urgent"));
        assert_eq!(parsed.args.len(), 3);
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let parsed = registry().parse_slash_command("/fleet search=a=b").unwrap();
        assert_eq!(parsed.args["search"], "a=b");
    }

    #[test]
    fn non_commands_do_not_parse() {
        let registry = registry();
        assert_eq!(registry.parse_slash_command("fleet"), None);
        assert_eq!(registry.parse_slash_command("/"), None);
        assert_eq!(registry.parse_slash_command("/teleport now"), None);
    }

    #[test]
    fn build_reports_every_problem() {
        let tool = ToolDefinition::read_only("a.list", "A", "A", "a", Permission::FleetRead);
        let err = ToolRegistry::builder()
            .tool_with_command(tool.clone(), "a", "", "")
            .tool_with_command(tool, "a", "", "")
            .build()
            .unwrap_err();

        assert_eq!(
            err.problems,
            vec![
                RegistryProblem::DuplicateTool { name: "a.list".to_string() },
                RegistryProblem::DuplicateCommand { command: "a".to_string() },
            ]
        );
    }
}
