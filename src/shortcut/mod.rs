//! Executability precheck for user-defined shortcuts.
//!
//! The check is advisory: it decides how a shortcut button renders. The
//! services still enforce permissions when the underlying action runs.

mod error;
mod registry;

pub use error::{RegistryError, RegistryProblem};
pub use registry::{ParsedCommand, SlashCommand, ToolDefinition, ToolRegistry, ToolRegistryBuilder};

use crate::permissions::{Permission, PermissionTable, Role};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// What a shortcut does when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ToolAction,
    PromptTemplate,
    ToolSequence,
    SavedView,
}

impl ActionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tool_action" => Some(Self::ToolAction),
            "prompt_template" => Some(Self::PromptTemplate),
            "tool_sequence" => Some(Self::ToolSequence),
            "saved_view" => Some(Self::SavedView),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub tool_name: String,
}

/// A stored shortcut definition. Fields are kept loose because shortcuts
/// are user-authored; the validator reports what is wrong with them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: String,
    pub name: String,
    pub action_type: String,
    pub prompt_template: Option<String>,
    pub tool_name: Option<String>,
    pub tool_sequence: Vec<SequenceStep>,
    pub is_active: bool,
    pub permission_scope_required: Option<String>,
}

/// Where the user is when the shortcut is offered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutContext {
    pub conversation_id: Option<String>,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_state: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    Ok,
    Inactive,
    ConfigInvalidNoTool,
    ConfigInvalidUnknownTool,
    ConfigInvalidNoTemplate,
    ConfigInvalidNoSequence,
    ConfigInvalidUnknownAction,
    MissingContext,
    PermissionDenied,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShortcutValidation {
    pub visible: bool,
    pub enabled: bool,
    pub disabled_reason: Option<String>,
    pub missing_context: Vec<String>,
    pub missing_permissions: Vec<String>,
    pub config_valid: bool,
    pub code: ValidationCode,
}

impl ShortcutValidation {
    fn blocked(visible: bool, config_valid: bool, reason: String, code: ValidationCode) -> Self {
        Self {
            visible,
            enabled: false,
            disabled_reason: Some(reason),
            missing_context: Vec::new(),
            missing_permissions: Vec::new(),
            config_valid,
            code,
        }
    }
}

enum Blocker {
    Context(&'static str),
    Permission(String),
}

type Check = Validation<(), NonEmptyVec<Blocker>>;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Copy, Debug)]
pub struct ShortcutValidator<'a> {
    permissions: &'a PermissionTable,
    tools: &'a ToolRegistry,
}

impl<'a> ShortcutValidator<'a> {
    pub fn new(permissions: &'a PermissionTable, tools: &'a ToolRegistry) -> Self {
        Self { permissions, tools }
    }

    /// Decide whether `shortcut` can run for `role` in `context`.
    ///
    /// Inactive and misconfigured shortcuts are reported immediately.
    /// Otherwise missing context and missing permissions are gathered
    /// together, with missing context chosen as the disabled reason.
    pub fn validate(
        &self,
        shortcut: &Shortcut,
        context: &ShortcutContext,
        role: Role,
    ) -> ShortcutValidation {
        if !shortcut.is_active {
            return ShortcutValidation::blocked(
                false,
                true,
                "Shortcut is inactive".to_string(),
                ValidationCode::Inactive,
            );
        }

        let action = match self.check_config(shortcut) {
            Ok(action) => action,
            Err((reason, code)) => return ShortcutValidation::blocked(true, false, reason, code),
        };

        let mut checks: Vec<Check> = Vec::new();
        if action != ActionType::SavedView && non_blank(&context.conversation_id).is_none() {
            checks.push(Validation::fail(Blocker::Context("conversationId")));
        }
        for permission in self.required_permissions(shortcut, action) {
            let held = permission
                .parse::<Permission>()
                .is_ok_and(|p| self.permissions.has_permission(role, p));
            let check = if held {
                Validation::success(())
            } else {
                Validation::fail(Blocker::Permission(permission))
            };
            checks.push(check);
        }

        let mut missing_context = Vec::new();
        let mut missing_permissions = Vec::new();
        if let Validation::Failure(blockers) = Validation::all_vec(checks) {
            for blocker in blockers.iter() {
                match blocker {
                    Blocker::Context(field) => missing_context.push(field.to_string()),
                    Blocker::Permission(permission) => missing_permissions.push(permission.clone()),
                }
            }
        }

        let (disabled_reason, code) = if missing_context.iter().any(|c| c == "conversationId") {
            (Some("Start a conversation first".to_string()), ValidationCode::MissingContext)
        } else if !missing_context.is_empty() {
            (
                Some(format!("Missing context: {}", missing_context.join(", "))),
                ValidationCode::MissingContext,
            )
        } else if !missing_permissions.is_empty() {
            (
                Some(format!("Requires permission: {}", missing_permissions.join(", "))),
                ValidationCode::PermissionDenied,
            )
        } else {
            (None, ValidationCode::Ok)
        };

        ShortcutValidation {
            visible: true,
            enabled: disabled_reason.is_none(),
            disabled_reason,
            missing_context,
            missing_permissions,
            config_valid: true,
            code,
        }
    }

    fn check_config(&self, shortcut: &Shortcut) -> Result<ActionType, (String, ValidationCode)> {
        let Some(action) = ActionType::parse(&shortcut.action_type) else {
            return Err((
                format!("Unknown action type: {}", shortcut.action_type),
                ValidationCode::ConfigInvalidUnknownAction,
            ));
        };

        match action {
            ActionType::ToolAction => match non_blank(&shortcut.tool_name) {
                None => Err((
                    "Shortcut configuration invalid (missing tool_name)".to_string(),
                    ValidationCode::ConfigInvalidNoTool,
                )),
                Some(name) if self.tools.get(name).is_none() => Err((
                    format!("Tool \"{name}\" not found"),
                    ValidationCode::ConfigInvalidUnknownTool,
                )),
                Some(_) => Ok(action),
            },
            ActionType::PromptTemplate if non_blank(&shortcut.prompt_template).is_none() => Err((
                "Shortcut configuration invalid (missing prompt template)".to_string(),
                ValidationCode::ConfigInvalidNoTemplate,
            )),
            ActionType::ToolSequence if shortcut.tool_sequence.is_empty() => Err((
                "Shortcut configuration invalid (empty tool sequence)".to_string(),
                ValidationCode::ConfigInvalidNoSequence,
            )),
            _ => Ok(action),
        }
    }

    /// Permission names the shortcut needs, de-duplicated, in discovery
    /// order. Sequence steps naming unknown tools contribute nothing.
    fn required_permissions(&self, shortcut: &Shortcut, action: ActionType) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        let mut push = |permission: &str| {
            if !required.iter().any(|p| p == permission) {
                required.push(permission.to_string());
            }
        };

        if let Some(scope) = non_blank(&shortcut.permission_scope_required) {
            push(scope);
        }

        match action {
            ActionType::ToolAction => {
                let tool = non_blank(&shortcut.tool_name).and_then(|name| self.tools.get(name));
                if let Some(tool) = tool {
                    push(tool.required_permission.as_str());
                }
            }
            ActionType::ToolSequence => {
                for step in &shortcut.tool_sequence {
                    if let Some(tool) = self.tools.get(&step.tool_name) {
                        push(tool.required_permission.as_str());
                    }
                }
            }
            ActionType::PromptTemplate | ActionType::SavedView => {}
        }

        required
    }
}
