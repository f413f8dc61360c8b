//! Fleet lifecycle: typed state machines and role permissions for fleet-rental
//! operations.
//!
//! The crate keeps a pure core and a thin imperative shell. Transition graphs
//! and the role table are immutable values built once at startup; validating a
//! transition or checking a permission never touches storage. The services
//! are the shell: they load a record, ask the core, and commit the state change
//! together with its audit entry.
//!
//! # Core Concepts
//!
//! - **State**: one enum per entity kind, generated with [`state_enum!`]
//! - **StateMachine**: the allowed-transition graph plus terminal,
//!   reason-required and override-allowed sets
//! - **PermissionTable**: role to capability lookup, failing closed
//! - **Audit**: append-only record of every creation and transition
//!
//! # Example
//!
//! ```rust
//! use fleet_lifecycle::lifecycle::{Lifecycles, RentalStatus, VehicleStatus};
//! use fleet_lifecycle::permissions::{Permission, PermissionTable, Role};
//!
//! let lifecycles = Lifecycles::standard().unwrap();
//! let permissions = PermissionTable::standard();
//!
//! let check = lifecycles
//!     .vehicle()
//!     .validate(VehicleStatus::Available, VehicleStatus::OutOfService, false);
//! assert!(check.valid);
//! assert!(check.reason_required);
//!
//! let check = lifecycles
//!     .rental()
//!     .validate(RentalStatus::Cancelled, RentalStatus::Active, true);
//! assert!(!check.valid);
//!
//! assert!(!permissions.has_permission(Role::BranchAgent, Permission::FinanceApproveRefund));
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod lifecycle;
pub mod machine;
pub mod permissions;
pub mod service;
pub mod shortcut;

// Re-export commonly used types
pub use crate::core::{State, UnknownState};
pub use crate::lifecycle::{EntityKind, Lifecycles};
pub use crate::machine::{StateMachine, TransitionValidation};
pub use crate::permissions::{Permission, PermissionTable, Role};
