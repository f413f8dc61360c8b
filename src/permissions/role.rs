//! Actor roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0:?}")]
pub struct UnknownRole(pub String);

/// Actor classification, fixed for the lifetime of a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    BranchAgent,
    ShiftSupervisor,
    BranchManager,
    FleetCoordinator,
    DamageClaimsStaff,
    FinanceStaff,
    FinanceManager,
    OperationsDirector,
    Admin,
    Auditor,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::BranchAgent,
        Role::ShiftSupervisor,
        Role::BranchManager,
        Role::FleetCoordinator,
        Role::DamageClaimsStaff,
        Role::FinanceStaff,
        Role::FinanceManager,
        Role::OperationsDirector,
        Role::Admin,
        Role::Auditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BranchAgent => "BRANCH_AGENT",
            Role::ShiftSupervisor => "SHIFT_SUPERVISOR",
            Role::BranchManager => "BRANCH_MANAGER",
            Role::FleetCoordinator => "FLEET_COORDINATOR",
            Role::DamageClaimsStaff => "DAMAGE_CLAIMS_STAFF",
            Role::FinanceStaff => "FINANCE_STAFF",
            Role::FinanceManager => "FINANCE_MANAGER",
            Role::OperationsDirector => "OPERATIONS_DIRECTOR",
            Role::Admin => "ADMIN",
            Role::Auditor => "AUDITOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}
