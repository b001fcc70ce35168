use std::sync::Arc;

use tracing::{debug, error};

use aid_domain::{convert, dn, Fault, ForeignObject, IntentObject, Resource, FAULT_TYPE};
use aid_store::IntentStore;

use crate::errors::ReconcileError;
use crate::universe::{ResourceBatch, UniverseObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushMethod {
    Create,
    Delete,
}

impl std::fmt::Display for PushMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushMethod::Create => write!(f, "create"),
            PushMethod::Delete => write!(f, "delete"),
        }
    }
}

/// The outbound half of a desired-state universe: converts incoming items to
/// the intent model where needed, routes faults to their parent resource and
/// applies everything to the intent store.
pub(crate) struct ResourceDispatcher {
    store: Arc<dyn IntentStore>,
}

impl ResourceDispatcher {
    pub(crate) fn new(store: Arc<dyn IntentStore>) -> Self {
        ResourceDispatcher { store }
    }

    /// Apply a batch. One bad item never poisons the rest: per-item errors
    /// are logged and the loop continues.
    pub(crate) async fn dispatch(&self, batch: &ResourceBatch) {
        self.dispatch_bucket(PushMethod::Create, &batch.create).await;
        self.dispatch_bucket(PushMethod::Delete, &batch.delete).await;
    }

    async fn dispatch_bucket(&self, method: PushMethod, items: &[UniverseObject]) {
        for item in items {
            if let Err(err) = self.dispatch_item(method, item).await {
                error!(method = %method, item = %item, error = %err, "failed to push object");
            }
        }
    }

    async fn dispatch_item(
        &self,
        method: PushMethod,
        item: &UniverseObject,
    ) -> Result<(), ReconcileError> {
        // Items arrive in the peer universe's format unless they are
        // deletions, which were hydrated locally.
        let converted: Vec<IntentObject> = match (method, item) {
            (_, UniverseObject::Intent(object)) => vec![object.clone()],
            (PushMethod::Create, UniverseObject::Foreign(foreign)) => {
                convert(std::slice::from_ref(foreign))
            }
            (PushMethod::Delete, UniverseObject::Foreign(_)) => {
                return Err(ReconcileError::Contract(
                    "delete items must be in the native format".to_string(),
                ));
            }
        };
        for object in converted {
            match object {
                IntentObject::Fault(fault) => {
                    let parent = self.retrieve_fault_parent(&fault)?;
                    debug!(
                        method = %method,
                        parent = %parent,
                        fault_code = %fault.fault_code,
                        "dispatching fault"
                    );
                    match method {
                        PushMethod::Create => self.store.set_fault(&parent, &fault).await?,
                        PushMethod::Delete => self.store.clear_fault(&parent, &fault).await?,
                    }
                }
                IntentObject::Resource(resource) => {
                    debug!(method = %method, resource = %resource, "dispatching resource");
                    match method {
                        PushMethod::Create => self.store.create(&resource, true).await?,
                        PushMethod::Delete => self.store.delete(&resource).await?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Recover a fault's parent resource by trimming the fault segment off
    /// its external identifier and converting the rebuilt parent DN.
    fn retrieve_fault_parent(&self, fault: &Fault) -> Result<Resource, ReconcileError> {
        let decomposed = dn::decompose_with_type(&fault.external_identifier, FAULT_TYPE)?;
        let parent_segments = &decomposed[..decomposed.len() - 1];
        if parent_segments.is_empty() {
            return Err(ReconcileError::Contract(format!(
                "fault {} has no parent dn",
                fault.external_identifier
            )));
        }
        let parent_dn = dn::build_dn(parent_segments)?;
        let (leaf_type, _) = &parent_segments[parent_segments.len() - 1];
        let shell = ForeignObject::new(leaf_type.clone(), parent_dn);
        match convert(&[shell]).into_iter().next() {
            Some(IntentObject::Resource(parent)) => Ok(parent),
            _ => Err(ReconcileError::Contract(format!(
                "could not recover fault parent from {}",
                fault.external_identifier
            ))),
        }
    }
}
