use std::sync::Arc;

use async_trait::async_trait;

use aid_config::AidConfig;
use aid_domain::{ResourceKey, TenantId};
use aid_store::IntentStore;
use aid_tree::HashTreeView;

use crate::desired::DesiredUniverse;
use crate::errors::{ErrorKind, ReconcileError};
use crate::universe::{ResourceBatch, Universe, UniverseObject};

/// The desired universe restricted to operational sub-state (faults): it
/// reads and diffs the operational trees instead of the config trees, and
/// otherwise behaves exactly like [`DesiredUniverse`].
pub struct DesiredOperationalUniverse {
    inner: DesiredUniverse,
}

impl DesiredOperationalUniverse {
    pub fn new(name: impl Into<String>, store: Arc<dyn IntentStore>, config: &AidConfig) -> Self {
        DesiredOperationalUniverse {
            inner: DesiredUniverse::new(name, store, config),
        }
    }
}

#[async_trait]
impl Universe for DesiredOperationalUniverse {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn serve(&self, tenants: &[TenantId]) {
        self.inner.serve(tenants);
    }

    async fn observe(&self) -> Result<(), ReconcileError> {
        self.inner.observe().await
    }

    async fn state(&self) -> Result<HashTreeView, ReconcileError> {
        self.inner.tree_state(None, true).await
    }

    async fn get_optimized_state(
        &self,
        other_state: &HashTreeView,
    ) -> Result<HashTreeView, ReconcileError> {
        self.inner.tree_state(Some(other_state), true).await
    }

    async fn get_resources(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError> {
        self.inner.get_resources(keys).await
    }

    async fn get_resources_for_delete(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError> {
        self.inner.get_resources_for_delete(keys).await
    }

    async fn push_resources(&self, batch: ResourceBatch) -> Result<(), ReconcileError> {
        self.inner.push_resources(batch).await
    }

    async fn cleanup_state(&self, tenant: &TenantId) -> Result<(), ReconcileError> {
        self.inner.cleanup_state(tenant).await
    }

    async fn reset(&self, tenants: &[TenantId]) -> Result<(), ReconcileError> {
        self.inner.reset(tenants).await
    }

    async fn creation_succeeded(&self, object: &UniverseObject) -> Result<(), ReconcileError> {
        self.inner.creation_succeeded(object).await
    }

    async fn creation_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError> {
        self.inner.creation_failed(object, reason, kind).await
    }

    async fn deletion_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError> {
        self.inner.deletion_failed(object, reason, kind).await
    }
}
