use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use aid_domain::{
    fault_tree_key, schema_for_kind, tree_key_for, Fault, ObjectIdentity, Resource,
    ResourceStatus, SyncState, TenantId,
};
use aid_tree::{HashTree, HashTreeView, TreeError};

use crate::error::StoreError;
use crate::store::IntentStore;

#[derive(Debug, Default)]
struct Inner {
    resources: HashMap<ObjectIdentity, Resource>,
    statuses: HashMap<ObjectIdentity, ResourceStatus>,
    config_trees: HashMap<TenantId, HashTree>,
    operational_trees: HashMap<TenantId, HashTree>,
}

/// In-memory implementation of [`IntentStore`].
///
/// All data is lost on process exit. Suitable for tests and the
/// snapshot-backed CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn identity_tenant(identity: &ObjectIdentity) -> Option<TenantId> {
    identity.ids().first().map(TenantId::new)
}

/// Tree payload of a fault node. Timestamps are excluded so re-observing an
/// identical fault does not change the tree hash.
fn fault_attributes(fault: &Fault) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    out.insert("code".to_string(), fault.fault_code.clone());
    out.insert("severity".to_string(), fault.severity.to_string());
    out.insert("descr".to_string(), fault.description.clone());
    out
}

fn ignore_missing(result: Result<(), TreeError>) -> Result<(), StoreError> {
    match result {
        Ok(()) | Err(TreeError::KeyNotFound(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

impl Inner {
    fn tenant_of(&self, resource: &Resource) -> Result<TenantId, StoreError> {
        resource
            .tenant()
            .ok_or_else(|| StoreError::Internal(format!("resource {} has no tenant", resource)))
    }

    fn status_entry(&mut self, resource: &Resource) -> &mut ResourceStatus {
        self.statuses
            .entry(resource.object_identity())
            .or_default()
    }
}

#[async_trait]
impl IntentStore for InMemoryStore {
    async fn get(&self, resource: &Resource) -> Result<Option<Resource>, StoreError> {
        if schema_for_kind(&resource.kind).is_none() {
            return Err(StoreError::UnknownResourceType(resource.kind.clone()));
        }
        let guard = self.inner.read().await;
        Ok(guard.resources.get(&resource.object_identity()).cloned())
    }

    async fn create(&self, resource: &Resource, overwrite: bool) -> Result<(), StoreError> {
        let key = tree_key_for(resource)?;
        let mut guard = self.inner.write().await;
        let tenant = guard.tenant_of(resource)?;
        let identity = resource.object_identity();
        if !overwrite && guard.resources.contains_key(&identity) {
            return Err(StoreError::AlreadyExists(identity.to_string()));
        }
        guard.resources.insert(identity, resource.clone());
        guard
            .config_trees
            .entry(tenant)
            .or_default()
            .add(&key, &resource.canonical_attributes())?;
        Ok(())
    }

    async fn delete(&self, resource: &Resource) -> Result<(), StoreError> {
        let key = tree_key_for(resource)?;
        let mut guard = self.inner.write().await;
        let tenant = guard.tenant_of(resource)?;
        let identity = resource.object_identity();
        guard.resources.remove(&identity);
        if let Some(status) = guard.statuses.remove(&identity) {
            if let Some(tree) = guard.operational_trees.get_mut(&tenant) {
                for fault in &status.faults {
                    ignore_missing(tree.remove(&fault_tree_key(&key, &fault.fault_code)))?;
                }
            }
        }
        if let Some(tree) = guard.config_trees.get_mut(&tenant) {
            ignore_missing(tree.remove(&key))?;
        }
        Ok(())
    }

    async fn get_status(&self, resource: &Resource) -> Result<Option<ResourceStatus>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.statuses.get(&resource.object_identity()).cloned())
    }

    async fn set_fault(&self, parent: &Resource, fault: &Fault) -> Result<(), StoreError> {
        let parent_key = tree_key_for(parent)?;
        let mut guard = self.inner.write().await;
        let tenant = guard.tenant_of(parent)?;

        let mut fault = fault.clone();
        if fault.last_update.is_none() {
            fault.last_update = Some(Utc::now());
        }
        let status = guard.status_entry(parent);
        status.faults.retain(|f| f.fault_code != fault.fault_code);
        status.faults.push(fault.clone());

        guard
            .operational_trees
            .entry(tenant)
            .or_default()
            .add(
                &fault_tree_key(&parent_key, &fault.fault_code),
                &fault_attributes(&fault),
            )?;
        Ok(())
    }

    async fn clear_fault(&self, parent: &Resource, fault: &Fault) -> Result<(), StoreError> {
        let parent_key = tree_key_for(parent)?;
        let mut guard = self.inner.write().await;
        let tenant = guard.tenant_of(parent)?;
        if let Some(status) = guard.statuses.get_mut(&parent.object_identity()) {
            status.faults.retain(|f| f.fault_code != fault.fault_code);
        }
        if let Some(tree) = guard.operational_trees.get_mut(&tenant) {
            ignore_missing(tree.remove(&fault_tree_key(&parent_key, &fault.fault_code)))?;
        }
        Ok(())
    }

    async fn set_resource_sync_synced(&self, resource: &Resource) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let status = guard.status_entry(resource);
        status.sync_state = SyncState::Synced;
        status.sync_message.clear();
        status.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn set_resource_sync_error(
        &self,
        resource: &Resource,
        message: &str,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let status = guard.status_entry(resource);
        status.sync_state = SyncState::Error;
        status.sync_message = message.to_string();
        status.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn find_changed(
        &self,
        request: &HashMap<TenantId, Option<String>>,
        operational: bool,
    ) -> Result<HashTreeView, StoreError> {
        let guard = self.inner.read().await;
        let trees = if operational {
            &guard.operational_trees
        } else {
            &guard.config_trees
        };
        let mut out = HashMap::new();
        for (tenant, known_hash) in request {
            let tree = trees.get(tenant).cloned().unwrap_or_default();
            let changed = match known_hash {
                None => true,
                Some(hash) => tree.root_full_hash() != Some(hash.as_str()),
            };
            if changed {
                out.insert(tenant.clone(), tree);
            }
        }
        Ok(out)
    }

    async fn drop_tenant(&self, tenant: &TenantId) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        guard.config_trees.remove(tenant);
        guard.operational_trees.remove(tenant);
        guard
            .resources
            .retain(|_, res| res.tenant().as_ref() != Some(tenant));
        guard
            .statuses
            .retain(|identity, _| identity_tenant(identity).as_ref() != Some(tenant));
        Ok(())
    }

    async fn rebuild_tenant(&self, tenant: &TenantId) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;

        let mut config = HashTree::new();
        for resource in guard.resources.values() {
            if resource.tenant().as_ref() != Some(tenant) {
                continue;
            }
            let key = tree_key_for(resource)?;
            config.add(&key, &resource.canonical_attributes())?;
        }

        let mut operational = HashTree::new();
        for (identity, status) in &guard.statuses {
            if identity_tenant(identity).as_ref() != Some(tenant) || status.faults.is_empty() {
                continue;
            }
            let Some(parent) = guard.resources.get(identity) else {
                continue;
            };
            let parent_key = tree_key_for(parent)?;
            for fault in &status.faults {
                operational.add(
                    &fault_tree_key(&parent_key, &fault.fault_code),
                    &fault_attributes(fault),
                )?;
            }
        }

        guard.config_trees.insert(tenant.clone(), config);
        guard.operational_trees.insert(tenant.clone(), operational);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant_res(name: &str) -> Resource {
        Resource::new("Tenant", vec![name.to_string()])
    }

    fn bd(tenant: &str, name: &str) -> Resource {
        Resource::new("BridgeDomain", vec![tenant.to_string(), name.to_string()])
    }

    async fn config_hash(store: &InMemoryStore, tenant: &str) -> Option<String> {
        let request = HashMap::from([(TenantId::new(tenant), None)]);
        let view = store.find_changed(&request, false).await.unwrap();
        view[&TenantId::new(tenant)]
            .root_full_hash()
            .map(str::to_string)
    }

    #[tokio::test]
    async fn create_and_get() {
        let store = InMemoryStore::new();
        let res = bd("t1", "bd1").with_attribute("arp_flood", "yes");
        store.create(&res, false).await.unwrap();

        let got = store.get(&bd("t1", "bd1")).await.unwrap().unwrap();
        assert_eq!(got.attribute("arp_flood"), Some("yes"));
    }

    #[tokio::test]
    async fn create_without_overwrite_rejects_duplicates() {
        let store = InMemoryStore::new();
        store.create(&bd("t1", "bd1"), false).await.unwrap();
        assert!(matches!(
            store.create(&bd("t1", "bd1"), false).await,
            Err(StoreError::AlreadyExists(_))
        ));
        store.create(&bd("t1", "bd1"), true).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected() {
        let store = InMemoryStore::new();
        let res = Resource::new("FlubberDomain", vec!["t1".to_string()]);
        assert!(matches!(
            store.create(&res, true).await,
            Err(StoreError::UnknownResourceType(_))
        ));
        assert!(store.get(&res).await.is_err());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_updates_the_tree() {
        let store = InMemoryStore::new();
        store.create(&bd("t1", "bd1"), false).await.unwrap();
        let before = config_hash(&store, "t1").await;
        assert!(before.is_some());

        store.delete(&bd("t1", "bd1")).await.unwrap();
        assert!(store.get(&bd("t1", "bd1")).await.unwrap().is_none());
        assert_eq!(config_hash(&store, "t1").await, None);

        store.delete(&bd("t1", "bd1")).await.unwrap();
    }

    #[tokio::test]
    async fn faults_live_in_the_operational_tree_only() {
        let store = InMemoryStore::new();
        let parent = bd("t1", "bd1");
        store.create(&parent, false).await.unwrap();
        let config_before = config_hash(&store, "t1").await;

        let fault = Fault::new("F0123", "uni/tn-t1/BD-bd1/fault-F0123");
        store.set_fault(&parent, &fault).await.unwrap();

        assert_eq!(config_hash(&store, "t1").await, config_before);
        let request = HashMap::from([(TenantId::new("t1"), None)]);
        let operational = store.find_changed(&request, true).await.unwrap();
        assert!(!operational[&TenantId::new("t1")].is_empty());

        let status = store.get_status(&parent).await.unwrap().unwrap();
        assert_eq!(status.faults.len(), 1);
        assert_eq!(status.faults[0].fault_code, "F0123");

        store.clear_fault(&parent, &fault).await.unwrap();
        let status = store.get_status(&parent).await.unwrap().unwrap();
        assert!(status.faults.is_empty());
        let operational = store.find_changed(&request, true).await.unwrap();
        assert!(operational[&TenantId::new("t1")].is_empty());
    }

    #[tokio::test]
    async fn set_fault_replaces_by_code() {
        let store = InMemoryStore::new();
        let parent = bd("t1", "bd1");
        store.create(&parent, false).await.unwrap();

        let fault = Fault::new("F0123", "uni/tn-t1/BD-bd1/fault-F0123");
        store.set_fault(&parent, &fault).await.unwrap();
        store
            .set_fault(&parent, &fault.clone().with_description("again"))
            .await
            .unwrap();

        let status = store.get_status(&parent).await.unwrap().unwrap();
        assert_eq!(status.faults.len(), 1);
        assert_eq!(status.faults[0].description, "again");
    }

    #[tokio::test]
    async fn sync_markers_round_trip() {
        let store = InMemoryStore::new();
        let res = bd("t1", "bd1");
        store.create(&res, false).await.unwrap();

        store
            .set_resource_sync_error(&res, "push rejected")
            .await
            .unwrap();
        let status = store.get_status(&res).await.unwrap().unwrap();
        assert_eq!(status.sync_state, SyncState::Error);
        assert_eq!(status.sync_message, "push rejected");

        store.set_resource_sync_synced(&res).await.unwrap();
        let status = store.get_status(&res).await.unwrap().unwrap();
        assert_eq!(status.sync_state, SyncState::Synced);
        assert!(status.sync_message.is_empty());
    }

    #[tokio::test]
    async fn find_changed_elides_matching_hashes() {
        let store = InMemoryStore::new();
        store.create(&tenant_res("t1"), false).await.unwrap();
        let hash = config_hash(&store, "t1").await.unwrap();

        let request = HashMap::from([(TenantId::new("t1"), Some(hash.clone()))]);
        let view = store.find_changed(&request, false).await.unwrap();
        assert!(view.is_empty(), "matching hash should be elided");

        let request = HashMap::from([(TenantId::new("t1"), Some("stale".to_string()))]);
        let view = store.find_changed(&request, false).await.unwrap();
        assert_eq!(view.len(), 1);

        // Unknown tenants come back as empty trees so callers can see them.
        let request = HashMap::from([(TenantId::new("ghost"), None)]);
        let view = store.find_changed(&request, false).await.unwrap();
        assert!(view[&TenantId::new("ghost")].is_empty());
    }

    #[tokio::test]
    async fn drop_tenant_purges_everything() {
        let store = InMemoryStore::new();
        store.create(&tenant_res("t1"), false).await.unwrap();
        store.create(&bd("t1", "bd1"), false).await.unwrap();
        store.create(&tenant_res("t2"), false).await.unwrap();
        store
            .set_fault(
                &bd("t1", "bd1"),
                &Fault::new("F0123", "uni/tn-t1/BD-bd1/fault-F0123"),
            )
            .await
            .unwrap();

        store.drop_tenant(&TenantId::new("t1")).await.unwrap();
        assert!(store.get(&bd("t1", "bd1")).await.unwrap().is_none());
        assert!(store
            .get_status(&bd("t1", "bd1"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(config_hash(&store, "t1").await, None);
        assert!(config_hash(&store, "t2").await.is_some());
    }

    #[tokio::test]
    async fn rebuild_tenant_recomputes_trees_from_data() {
        let store = InMemoryStore::new();
        store.create(&tenant_res("t1"), false).await.unwrap();
        store.create(&bd("t1", "bd1"), false).await.unwrap();
        let before = config_hash(&store, "t1").await;

        store.rebuild_tenant(&TenantId::new("t1")).await.unwrap();
        assert_eq!(config_hash(&store, "t1").await, before);
    }
}
