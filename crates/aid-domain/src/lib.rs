pub mod convert;
pub mod dn;
pub mod error;
pub mod foreign;
pub mod key;
pub mod model;
pub mod resource;
pub mod status;
pub mod types;

mod tests;

pub use convert::convert;
pub use error::DomainError;
pub use foreign::ForeignObject;
pub use key::{DissectedKey, ResourceKey};
pub use model::{
    fault_tree_key, schema_for_foreign, schema_for_kind, tree_key_for, ResourceSchema, FAULT_TYPE,
};
pub use resource::{IntentObject, ObjectIdentity, Resource};
pub use status::{Fault, FaultSeverity, ResourceStatus, SyncState};
pub use types::TenantId;
