//! The closed set of capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown permission: {0:?}")]
pub struct UnknownPermission(pub String);

macro_rules! permissions {
    ($($variant:ident => $wire:literal),* $(,)?) => {
        /// A `resource:action` capability.
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
        )]
        pub enum Permission {
            $(
                #[serde(rename = $wire)]
                $variant
            ),*
        }

        impl Permission {
            /// Every permission, in declaration order.
            pub const ALL: &'static [Permission] = &[$(Permission::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $wire),*
                }
            }
        }
    };
}

permissions! {
    FleetRead => "fleet:read",
    FleetWrite => "fleet:write",
    FleetTransition => "fleet:transition",
    FleetTransfer => "fleet:transfer",
    FleetOverride => "fleet:override",
    RentalRead => "rental:read",
    RentalWrite => "rental:write",
    RentalCancel => "rental:cancel",
    PickupExecute => "pickup:execute",
    PickupWaiveDeposit => "pickup:waive_deposit",
    TaskRead => "task:read",
    TaskWrite => "task:write",
    TaskAssign => "task:assign",
    TaskComplete => "task:complete",
    IncidentRead => "incident:read",
    IncidentWrite => "incident:write",
    IncidentResolve => "incident:resolve",
    ClaimsRead => "claims:read",
    ClaimsManage => "claims:manage",
    ClaimsSettle => "claims:settle",
    MaintenanceRead => "maintenance:read",
    MaintenanceRequest => "maintenance:request",
    MaintenanceApprove => "maintenance:approve",
    FinanceRead => "finance:read",
    FinanceWrite => "finance:write",
    FinanceApproveRefund => "finance:approve_refund",
    FinanceOverride => "finance:override",
    ChatRead => "chat:read",
    ChatWrite => "chat:write",
    AnalyticsRead => "analytics:read",
    AnalyticsBranchCompare => "analytics:branch_compare",
    AuditRead => "audit:read",
    ApprovalRead => "approval:read",
    ApprovalDecide => "approval:decide",
    ShortcutCreate => "shortcut:create",
    ShortcutPublishBranch => "shortcut:publish_branch",
    ShortcutPublishOrg => "shortcut:publish_org",
    AdminManageUsers => "admin:manage_users",
    AdminManageBranches => "admin:manage_branches",
    ExportData => "export:data",
}

impl Permission {
    /// The resource half of the capability, e.g. `fleet`.
    pub fn resource(&self) -> &'static str {
        self.as_str()
            .split_once(':')
            .map(|(resource, _)| resource)
            .unwrap_or_default()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| UnknownPermission(value.to_string()))
    }
}
