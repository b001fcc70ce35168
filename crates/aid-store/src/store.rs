use std::collections::HashMap;

use async_trait::async_trait;

use aid_domain::{Fault, Resource, ResourceStatus, TenantId};
use aid_tree::HashTreeView;

use crate::error::StoreError;

/// The intent database behind a desired-state universe.
///
/// Implementations keep two tree summaries per tenant: the *config* tree
/// covering the resources themselves and the *operational* tree covering
/// sub-state such as faults. Both must stay consistent with the resource
/// data across every mutation.
#[async_trait]
pub trait IntentStore: Send + Sync + 'static {
    /// Look up a resource by identity. Non-identity attributes of the
    /// argument are ignored.
    async fn get(&self, resource: &Resource) -> Result<Option<Resource>, StoreError>;

    /// Insert a resource. Without `overwrite`, an existing resource with the
    /// same identity is an error.
    async fn create(&self, resource: &Resource, overwrite: bool) -> Result<(), StoreError>;

    /// Remove a resource and its status. Removing an absent resource is a
    /// no-op.
    async fn delete(&self, resource: &Resource) -> Result<(), StoreError>;

    async fn get_status(&self, resource: &Resource) -> Result<Option<ResourceStatus>, StoreError>;

    /// Attach a fault to `parent`, replacing any fault with the same code.
    async fn set_fault(&self, parent: &Resource, fault: &Fault) -> Result<(), StoreError>;

    /// Detach the fault with `fault.fault_code` from `parent`, if present.
    async fn clear_fault(&self, parent: &Resource, fault: &Fault) -> Result<(), StoreError>;

    async fn set_resource_sync_synced(&self, resource: &Resource) -> Result<(), StoreError>;

    async fn set_resource_sync_error(
        &self,
        resource: &Resource,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Return the tree of every requested tenant whose root full hash
    /// differs from the supplied one; `None` always returns the tree.
    /// Tenants with no recorded state yield an empty tree.
    async fn find_changed(
        &self,
        request: &HashMap<TenantId, Option<String>>,
        operational: bool,
    ) -> Result<HashTreeView, StoreError>;

    /// Purge all durable state for a tenant: resources, statuses and both
    /// trees.
    async fn drop_tenant(&self, tenant: &TenantId) -> Result<(), StoreError>;

    /// Recompute a tenant's trees from the stored resource data, discarding
    /// whatever the trees currently claim. Used to re-baseline tenants that
    /// diverged persistently.
    async fn rebuild_tenant(&self, tenant: &TenantId) -> Result<(), StoreError>;
}
