use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aid_domain::{ForeignObject, IntentObject, ObjectIdentity, ResourceKey, TenantId};
use aid_tree::HashTreeView;

use crate::errors::{ErrorKind, ReconcileError};
use crate::reconcile::{reconcile_pass, ReconcileOptions};
use crate::votes::DeleteVotes;

/// A resource as exchanged between universes.
///
/// `get_resources` returns objects in the producing universe's own format;
/// the receiving push path converts foreign objects and passes native ones
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum UniverseObject {
    Intent(IntentObject),
    Foreign(ForeignObject),
}

impl UniverseObject {
    pub fn object_identity(&self) -> ObjectIdentity {
        match self {
            UniverseObject::Intent(object) => object.object_identity(),
            UniverseObject::Foreign(foreign) => ObjectIdentity::new(
                &foreign.type_tag,
                &[foreign.dn().unwrap_or_default().to_string()],
            ),
        }
    }
}

impl std::fmt::Display for UniverseObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniverseObject::Intent(object) => write!(f, "{}", object),
            UniverseObject::Foreign(foreign) => write!(f, "{}", foreign),
        }
    }
}

/// The delta pushed through a universe in one reconcile pass. Create items
/// are in the peer universe's format; delete items are native.
#[derive(Debug, Clone, Default)]
pub struct ResourceBatch {
    pub create: Vec<UniverseObject>,
    pub delete: Vec<UniverseObject>,
}

impl ResourceBatch {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }
}

/// One side of the system: any observable state source whose per-tenant
/// summary trees can be diffed against another universe's.
///
/// Construction is the initialization step; a universe is fully usable as
/// soon as it exists. `state`, `get_optimized_state`, `get_resources` and
/// `push_resources` are the blocking points of a reconcile pass; everything
/// else works on memory.
#[async_trait]
pub trait Universe: Send + Sync {
    /// Readable name, also the ballot key in [`DeleteVotes`].
    fn name(&self) -> &str;

    /// Replace the served tenant set. Tenants removed from the set stay
    /// queryable until `cleanup_state` purges them.
    fn serve(&self, tenants: &[TenantId]);

    /// Refresh internal state from the underlying source. A no-op for
    /// universes that read state lazily.
    async fn observe(&self) -> Result<(), ReconcileError>;

    /// The current per-tenant tree summaries for every served tenant.
    async fn state(&self) -> Result<HashTreeView, ReconcileError>;

    /// Like [`state`](Self::state), but permitted to omit tenants whose root
    /// hash matches the corresponding entry of `other_state`.
    async fn get_optimized_state(
        &self,
        other_state: &HashTreeView,
    ) -> Result<HashTreeView, ReconcileError>;

    /// Hydrate keys into full resources, suppressing duplicates. Unknown
    /// resource types yield identity-only shells; they never fail the batch.
    async fn get_resources(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError>;

    /// Like [`get_resources`](Self::get_resources); concrete universes may
    /// return a lighter payload sufficient for deletion.
    async fn get_resources_for_delete(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError>;

    /// Apply a batch. Per-item failures are logged and never poison the
    /// rest of the batch.
    async fn push_resources(&self, batch: ResourceBatch) -> Result<(), ReconcileError>;

    /// Purge all durable state for a tenant.
    async fn cleanup_state(&self, tenant: &TenantId) -> Result<(), ReconcileError>;

    /// Bring persistently diverged tenants back to a clean baseline.
    async fn reset(&self, tenants: &[TenantId]) -> Result<(), ReconcileError>;

    async fn creation_succeeded(&self, object: &UniverseObject) -> Result<(), ReconcileError>;

    async fn creation_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError>;

    async fn deletion_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError>;

    /// Drive this universe toward `other`: diff the two states, hydrate the
    /// delta and push it through `self`, voting on tenant deletion along the
    /// way. Returns false when the universes were already in sync.
    async fn reconcile(
        &self,
        other: &dyn Universe,
        delete_votes: &DeleteVotes,
    ) -> Result<bool, ReconcileError> {
        reconcile_pass(self, other, delete_votes, ReconcileOptions::default()).await
    }
}
