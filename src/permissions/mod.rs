//! Role-based permission model.
//!
//! Roles map to a fixed set of `resource:action` capabilities. Lookups are
//! pure; the only state is the immutable [`PermissionTable`] built at
//! startup, either from the compiled-in grants or from a policy file (see
//! [`crate::config`]).
//!
//! Every entity-mutating operation is gated by exactly one
//! [`PermissionTable::require`] call before the state machine runs.

mod error;
mod permission;
mod role;
mod table;

pub use error::{PermissionDenied, RegistrationError};
pub use permission::{Permission, UnknownPermission};
pub use role::{Role, UnknownRole};
pub use table::PermissionTable;
