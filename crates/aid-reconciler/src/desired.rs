use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use aid_config::AidConfig;
use aid_domain::{schema_for_kind, IntentObject, Resource, ResourceKey, TenantId, FAULT_TYPE};
use aid_store::{IntentStore, StoreError};
use aid_tree::HashTreeView;

use crate::dispatch::ResourceDispatcher;
use crate::errors::{ErrorKind, ReconcileError};
use crate::fatal;
use crate::ledger::{FailureLedger, LedgerVerdict};
use crate::universe::{ResourceBatch, Universe, UniverseObject};

/// Universe of the desired state: observes the intent store lazily and
/// pushes incoming deltas back into it.
pub struct DesiredUniverse {
    name: String,
    store: Arc<dyn IntentStore>,
    served: Mutex<HashSet<TenantId>>,
    ledger: FailureLedger,
    dispatcher: ResourceDispatcher,
}

impl DesiredUniverse {
    pub fn new(name: impl Into<String>, store: Arc<dyn IntentStore>, config: &AidConfig) -> Self {
        DesiredUniverse {
            name: name.into(),
            dispatcher: ResourceDispatcher::new(store.clone()),
            store: store.clone(),
            served: Mutex::new(HashSet::new()),
            ledger: FailureLedger::new(config.max_operation_retry, config.retry_cooldown),
        }
    }

    fn served(&self) -> MutexGuard<'_, HashSet<TenantId>> {
        match self.served.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Served-tenant trees from the store, eliding tenants whose root hash
    /// matches the corresponding entry of `other_state`.
    pub(crate) async fn tree_state(
        &self,
        other_state: Option<&HashTreeView>,
        operational: bool,
    ) -> Result<HashTreeView, ReconcileError> {
        let request: HashMap<TenantId, Option<String>> = self
            .served()
            .iter()
            .map(|tenant| {
                let known = other_state
                    .and_then(|view| view.get(tenant))
                    .and_then(|tree| tree.root_full_hash())
                    .map(str::to_string);
                (tenant.clone(), known)
            })
            .collect();
        Ok(self.store.find_changed(&request, operational).await?)
    }

    async fn fail_synchronization(
        &self,
        object: &UniverseObject,
        operation: &str,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError> {
        let identity = object.object_identity();
        match self.ledger.on_failure(&identity, kind) {
            LedgerVerdict::Recorded { attempt } => {
                debug!(
                    universe = %self.name,
                    object = %identity,
                    operation,
                    attempt,
                    "synchronization failure recorded"
                );
            }
            LedgerVerdict::Throttled => {
                debug!(
                    universe = %self.name,
                    object = %identity,
                    operation,
                    "failure within cooldown, not accounted"
                );
            }
            LedgerVerdict::Surrender => {
                if kind == ErrorKind::OperationCritical {
                    debug!(
                        universe = %self.name,
                        object = %identity,
                        operation,
                        "surrendering object synchronization"
                    );
                } else {
                    warn!(
                        universe = %self.name,
                        object = %identity,
                        operation,
                        retries = self.ledger.max_operation_retry(),
                        "object failed too many times, setting sync state to error"
                    );
                }
                if let UniverseObject::Intent(IntentObject::Resource(resource)) = object {
                    self.store.set_resource_sync_error(resource, reason).await?;
                }
            }
            LedgerVerdict::Abort => fatal::abort_agent(reason),
        }
        Ok(())
    }

    async fn hydrate_fault(
        &self,
        parent: &Resource,
        fault_code: &str,
    ) -> Result<Option<UniverseObject>, ReconcileError> {
        let Some(status) = self.store.get_status(parent).await? else {
            return Ok(None);
        };
        Ok(status
            .faults
            .iter()
            .find(|fault| fault.fault_code == fault_code)
            .map(|fault| UniverseObject::Intent(IntentObject::Fault(fault.clone()))))
    }
}

#[async_trait]
impl Universe for DesiredUniverse {
    fn name(&self) -> &str {
        &self.name
    }

    fn serve(&self, tenants: &[TenantId]) {
        debug!(universe = %self.name, ?tenants, "serving tenants");
        *self.served() = tenants.iter().cloned().collect();
    }

    async fn observe(&self) -> Result<(), ReconcileError> {
        // State is read lazily from the store; nothing to refresh.
        Ok(())
    }

    async fn state(&self) -> Result<HashTreeView, ReconcileError> {
        self.tree_state(None, false).await
    }

    async fn get_optimized_state(
        &self,
        other_state: &HashTreeView,
    ) -> Result<HashTreeView, ReconcileError> {
        self.tree_state(Some(other_state), false).await
    }

    async fn get_resources(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        for key in keys {
            let mut fault_code = None;
            let mut dissected = key.dissect()?;
            if dissected.kind == FAULT_TYPE {
                fault_code = dissected.ids.last().cloned();
                dissected = key.without_leaf().dissect()?;
            }

            let Some(schema) = schema_for_kind(&dissected.kind) else {
                warn!(universe = %self.name, key = %key, kind = %dissected.kind, "resource type not defined in the model");
                let shell = Resource::new(dissected.kind.clone(), dissected.ids.clone());
                let identity = shell.object_identity();
                if seen.insert(identity) {
                    result.push(UniverseObject::Intent(IntentObject::Resource(shell)));
                }
                continue;
            };
            let resource = schema.resource_from_ids(&dissected.ids)?;

            let mut identity = resource.object_identity();
            if let Some(code) = &fault_code {
                identity = identity.with_fault(code);
            }
            if seen.contains(&identity) {
                continue;
            }

            if let Some(code) = &fault_code {
                if let Some(fault) = self.hydrate_fault(&resource, code).await? {
                    result.push(fault);
                    seen.insert(identity);
                }
            } else {
                match self.store.get(&resource).await {
                    Ok(Some(stored)) => {
                        result.push(UniverseObject::Intent(IntentObject::Resource(stored)));
                        seen.insert(identity);
                    }
                    Ok(None) => {}
                    Err(StoreError::UnknownResourceType(kind)) => {
                        warn!(universe = %self.name, key = %key, kind = %kind, "resource type not defined in the store");
                        result.push(UniverseObject::Intent(IntentObject::Resource(resource)));
                        seen.insert(identity);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Ok(result)
    }

    async fn get_resources_for_delete(
        &self,
        keys: &[ResourceKey],
    ) -> Result<Vec<UniverseObject>, ReconcileError> {
        self.get_resources(keys).await
    }

    async fn push_resources(&self, batch: ResourceBatch) -> Result<(), ReconcileError> {
        self.dispatcher.dispatch(&batch).await;
        Ok(())
    }

    async fn cleanup_state(&self, tenant: &TenantId) -> Result<(), ReconcileError> {
        debug!(universe = %self.name, tenant = %tenant, "purging tenant state");
        Ok(self.store.drop_tenant(tenant).await?)
    }

    async fn reset(&self, tenants: &[TenantId]) -> Result<(), ReconcileError> {
        for tenant in tenants {
            debug!(universe = %self.name, tenant = %tenant, "re-baselining tenant");
            self.store.rebuild_tenant(tenant).await?;
        }
        Ok(())
    }

    async fn creation_succeeded(&self, object: &UniverseObject) -> Result<(), ReconcileError> {
        self.ledger.on_success(&object.object_identity());
        if let UniverseObject::Intent(IntentObject::Resource(resource)) = object {
            self.store.set_resource_sync_synced(resource).await?;
        }
        Ok(())
    }

    async fn creation_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError> {
        self.fail_synchronization(object, "creation", reason, kind).await
    }

    async fn deletion_failed(
        &self,
        object: &UniverseObject,
        reason: &str,
        kind: ErrorKind,
    ) -> Result<(), ReconcileError> {
        self.fail_synchronization(object, "deletion", reason, kind).await
    }
}
