//! Permission errors.

use crate::permissions::permission::Permission;
use crate::permissions::role::Role;
use thiserror::Error;

/// The actor's role lacks the capability an operation is gated on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Missing permission: {permission} (role {role})")]
pub struct PermissionDenied {
    pub role: Role,
    pub permission: Permission,
}

/// A permission table was built without registering every role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Permission table leaves roles unregistered: {}", join_roles(.missing))]
pub struct RegistrationError {
    pub missing: Vec<Role>,
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
