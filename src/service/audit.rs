//! Permission-gated access to the audit trail.

use crate::audit::{AuditExport, AuditPage, AuditQuery};
use crate::permissions::{Permission, PermissionTable};
use crate::service::error::ServiceError;
use crate::service::store::LifecycleStore;
use crate::service::transition::Actor;
use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Clone, Copy, Debug)]
pub struct AuditService<'a> {
    permissions: &'a PermissionTable,
}

impl<'a> AuditService<'a> {
    pub fn new(permissions: &'a PermissionTable) -> Self {
        Self { permissions }
    }

    /// Search the trail. Requires `audit:read`.
    pub fn query<St: LifecycleStore>(
        &self,
        store: &St,
        actor: &Actor,
        query: &AuditQuery,
    ) -> Result<AuditPage, ServiceError> {
        self.permissions.require(actor.role, Permission::AuditRead)?;
        Ok(query.run(store.audit_entries()))
    }

    /// Snapshot entries matching `query`, ignoring its pagination.
    /// Requires `export:data`.
    pub fn export<St: LifecycleStore>(
        &self,
        store: &St,
        actor: &Actor,
        query: &AuditQuery,
        now: DateTime<Utc>,
    ) -> Result<AuditExport, ServiceError> {
        self.permissions.require(actor.role, Permission::ExportData)?;

        let entries: Vec<_> = store
            .audit_entries()
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();

        info!(actor = %actor.id, entries = entries.len(), "audit exported");
        Ok(AuditExport::new(entries, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::sample_entry;
    use crate::lifecycle::VehicleStatus;
    use crate::permissions::Role;
    use crate::service::store::{EntityRecord, InMemoryStore};

    fn store_with_two_vehicles() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for id in ["v-1", "v-2"] {
            store
                .insert(EntityRecord::<VehicleStatus>::new(id), sample_entry("vehicle.create", id))
                .unwrap();
        }
        store
    }

    #[test]
    fn agents_cannot_read_the_trail() {
        let table = PermissionTable::standard();
        let err = AuditService::new(&table)
            .query(
                &store_with_two_vehicles(),
                &Actor::new("a", Role::BranchAgent),
                &AuditQuery::new(),
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Missing permission: audit:read (role BRANCH_AGENT)");
    }

    #[test]
    fn auditor_queries_by_entity() {
        let table = PermissionTable::standard();
        let page = AuditService::new(&table)
            .query(
                &store_with_two_vehicles(),
                &Actor::new("aud", Role::Auditor),
                &AuditQuery::new().entity("Vehicle", "v-2"),
            )
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].entity_id, "v-2");
    }

    #[test]
    fn export_ignores_pagination() {
        let table = PermissionTable::standard();
        let export = AuditService::new(&table)
            .export(
                &store_with_two_vehicles(),
                &Actor::new("fin", Role::FinanceStaff),
                &AuditQuery::new().page(1, 1),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(export.entries.len(), 2);
        assert_eq!(export.entries[0].entity_id, "v-1");
    }

    #[test]
    fn export_requires_export_permission() {
        let table = PermissionTable::standard();
        let err = AuditService::new(&table)
            .export(
                &store_with_two_vehicles(),
                &Actor::new("a", Role::BranchAgent),
                &AuditQuery::new(),
                Utc::now(),
            )
            .unwrap_err();

        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }
}
