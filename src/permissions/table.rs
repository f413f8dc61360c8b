//! Role → permission lookup table.

use crate::permissions::error::{PermissionDenied, RegistrationError};
use crate::permissions::permission::Permission;
use crate::permissions::role::Role;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::permissions::permission::Permission as P;

/// Compiled-in grants. The match is exhaustive, so a new role cannot be
/// added without deciding its permissions.
#[rustfmt::skip]
fn standard_grants(role: Role) -> &'static [Permission] {
    match role {
        Role::BranchAgent => &[
            P::FleetRead, P::FleetTransition,
            P::RentalRead, P::RentalWrite,
            P::PickupExecute,
            P::TaskRead, P::TaskWrite, P::TaskComplete,
            P::IncidentRead, P::IncidentWrite,
            P::MaintenanceRead,
            P::FinanceRead,
            P::ChatRead, P::ChatWrite,
            P::ShortcutCreate,
        ],
        Role::ShiftSupervisor => &[
            P::FleetRead, P::FleetWrite, P::FleetTransition,
            P::RentalRead, P::RentalWrite, P::RentalCancel,
            P::PickupExecute,
            P::TaskRead, P::TaskWrite, P::TaskAssign, P::TaskComplete,
            P::IncidentRead, P::IncidentWrite,
            P::MaintenanceRead, P::MaintenanceRequest,
            P::FinanceRead,
            P::ChatRead, P::ChatWrite,
            P::AnalyticsRead,
            P::ShortcutCreate,
        ],
        Role::BranchManager => &[
            P::FleetRead, P::FleetWrite, P::FleetTransition, P::FleetTransfer,
            P::RentalRead, P::RentalWrite, P::RentalCancel,
            P::PickupExecute, P::PickupWaiveDeposit,
            P::TaskRead, P::TaskWrite, P::TaskAssign, P::TaskComplete,
            P::IncidentRead, P::IncidentWrite, P::IncidentResolve,
            P::ClaimsRead,
            P::MaintenanceRead, P::MaintenanceRequest, P::MaintenanceApprove,
            P::FinanceRead, P::FinanceWrite, P::FinanceApproveRefund,
            P::ChatRead, P::ChatWrite,
            P::AnalyticsRead,
            P::AuditRead,
            P::ApprovalRead, P::ApprovalDecide,
            P::ShortcutCreate, P::ShortcutPublishBranch,
            P::ExportData,
        ],
        Role::FleetCoordinator => &[
            P::FleetRead, P::FleetWrite, P::FleetTransition, P::FleetTransfer,
            P::RentalRead,
            P::TaskRead, P::TaskWrite, P::TaskAssign, P::TaskComplete,
            P::IncidentRead,
            P::MaintenanceRead, P::MaintenanceRequest, P::MaintenanceApprove,
            P::ChatRead, P::ChatWrite,
            P::AnalyticsRead,
            P::ShortcutCreate,
            P::ExportData,
        ],
        Role::DamageClaimsStaff => &[
            P::FleetRead,
            P::RentalRead,
            P::TaskRead, P::TaskWrite, P::TaskComplete,
            P::IncidentRead, P::IncidentWrite, P::IncidentResolve,
            P::ClaimsRead, P::ClaimsManage,
            P::MaintenanceRead,
            P::FinanceRead,
            P::ChatRead, P::ChatWrite,
            P::ShortcutCreate,
            P::ExportData,
        ],
        Role::FinanceStaff => &[
            P::FleetRead,
            P::RentalRead,
            P::TaskRead, P::TaskWrite, P::TaskComplete,
            P::FinanceRead, P::FinanceWrite,
            P::ChatRead, P::ChatWrite,
            P::ShortcutCreate,
            P::ExportData,
        ],
        Role::FinanceManager => &[
            P::FleetRead,
            P::RentalRead,
            P::PickupWaiveDeposit,
            P::TaskRead, P::TaskWrite, P::TaskAssign, P::TaskComplete,
            P::ClaimsRead,
            P::FinanceRead, P::FinanceWrite, P::FinanceApproveRefund, P::FinanceOverride,
            P::ChatRead, P::ChatWrite,
            P::AnalyticsRead,
            P::AuditRead,
            P::ApprovalRead, P::ApprovalDecide,
            P::ShortcutCreate,
            P::ExportData,
        ],
        Role::OperationsDirector => &[
            P::FleetRead, P::FleetWrite, P::FleetTransition, P::FleetTransfer, P::FleetOverride,
            P::RentalRead, P::RentalWrite, P::RentalCancel,
            P::PickupExecute, P::PickupWaiveDeposit,
            P::TaskRead, P::TaskWrite, P::TaskAssign, P::TaskComplete,
            P::IncidentRead, P::IncidentWrite, P::IncidentResolve,
            P::ClaimsRead, P::ClaimsManage, P::ClaimsSettle,
            P::MaintenanceRead, P::MaintenanceRequest, P::MaintenanceApprove,
            P::FinanceRead, P::FinanceWrite, P::FinanceApproveRefund, P::FinanceOverride,
            P::ChatRead, P::ChatWrite,
            P::AnalyticsRead, P::AnalyticsBranchCompare,
            P::AuditRead,
            P::ApprovalRead, P::ApprovalDecide,
            P::ShortcutCreate, P::ShortcutPublishOrg,
            P::ExportData,
        ],
        Role::Admin => Permission::ALL,
        Role::Auditor => &[
            P::FleetRead,
            P::RentalRead,
            P::TaskRead,
            P::IncidentRead,
            P::ClaimsRead,
            P::MaintenanceRead,
            P::FinanceRead,
            P::AnalyticsRead, P::AnalyticsBranchCompare,
            P::AuditRead,
            P::ApprovalRead,
            P::ExportData,
        ],
    }
}

/// Immutable role → permission table.
///
/// Built once at startup and shared by reference. Every [`Role`] is
/// registered; lookups never fall back to a default.
///
/// # Example
///
/// ```
/// use fleet_lifecycle::permissions::{Permission, PermissionTable, Role};
///
/// let table = PermissionTable::standard();
/// assert!(!table.has_permission(Role::BranchAgent, Permission::FinanceApproveRefund));
/// assert!(table.has_permission(Role::FinanceManager, Permission::FinanceApproveRefund));
/// assert!(!table.has_permission_raw("INTERN", "fleet:read"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionTable {
    grants: HashMap<Role, BTreeSet<Permission>>,
}

impl PermissionTable {
    /// The compiled-in table.
    pub fn standard() -> Self {
        let grants = Role::ALL
            .iter()
            .map(|role| (*role, standard_grants(*role).iter().copied().collect()))
            .collect();
        Self { grants }
    }

    /// Build a table from explicit grants. Every role must be present, even
    /// if its set is empty.
    pub fn from_grants(
        grants: HashMap<Role, BTreeSet<Permission>>,
    ) -> Result<Self, RegistrationError> {
        let missing: Vec<Role> = Role::ALL
            .iter()
            .copied()
            .filter(|role| !grants.contains_key(role))
            .collect();

        if !missing.is_empty() {
            return Err(RegistrationError { missing });
        }

        Ok(Self { grants })
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
    }

    /// A copy of the role's permission set.
    pub fn permissions(&self, role: Role) -> BTreeSet<Permission> {
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    pub fn has_any_permission(&self, role: Role, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .any(|permission| self.has_permission(role, *permission))
    }

    /// Gate form of [`has_permission`](Self::has_permission).
    pub fn require(&self, role: Role, permission: Permission) -> Result<(), PermissionDenied> {
        if self.has_permission(role, permission) {
            Ok(())
        } else {
            debug!(role = role.as_str(), permission = permission.as_str(), "permission denied");
            Err(PermissionDenied { role, permission })
        }
    }

    /// Lookup on raw strings. Unknown roles or permissions fail closed.
    pub fn has_permission_raw(&self, role: &str, permission: &str) -> bool {
        match (role.parse::<Role>(), permission.parse::<Permission>()) {
            (Ok(role), Ok(permission)) => self.has_permission(role, permission),
            _ => false,
        }
    }

    /// Permissions for a raw role string; empty for an unknown role.
    pub fn permissions_raw(&self, role: &str) -> BTreeSet<Permission> {
        role.parse::<Role>()
            .map(|role| self.permissions(role))
            .unwrap_or_default()
    }
}
