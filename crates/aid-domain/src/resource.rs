use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::schema_for_kind;
use crate::status::Fault;
use crate::types::TenantId;

/// Identity tuple of an object: type name followed by the ordered identity
/// attribute values. Stable across equal resources even when non-identity
/// attributes differ; used as the failure-ledger and deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectIdentity(Vec<String>);

impl ObjectIdentity {
    pub fn new(kind: &str, ids: &[String]) -> Self {
        let mut parts = Vec::with_capacity(ids.len() + 1);
        parts.push(kind.to_string());
        parts.extend(ids.iter().cloned());
        ObjectIdentity(parts)
    }

    pub fn kind(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    pub fn ids(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    /// Extend the tuple with a fault marker so distinct faults on the same
    /// parent stay distinct.
    pub fn with_fault(mut self, fault_code: &str) -> Self {
        self.0.push("fault".to_string());
        self.0.push(fault_code.to_string());
        self
    }
}

impl std::fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("|"))
    }
}

/// A domain object of the intent model: a type tag, the ordered identity
/// attribute values, and the remaining (non-identity) attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: String,
    pub identity: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Resource {
    /// An identity-only resource. Also the "shell" form handed through for
    /// resource types the model does not know.
    pub fn new(kind: impl Into<String>, identity: Vec<String>) -> Self {
        Resource {
            kind: kind.into(),
            identity,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn object_identity(&self) -> ObjectIdentity {
        ObjectIdentity::new(&self.kind, &self.identity)
    }

    /// The tenant this resource belongs to. The first identity value is the
    /// tenant name for every kind in the model (the key chain is rooted at
    /// `Tenant`).
    pub fn tenant(&self) -> Option<TenantId> {
        self.identity.first().map(TenantId::new)
    }

    /// All attributes by name, identity included, for content hashing.
    /// Unknown kinds fall back to positional identity names.
    pub fn canonical_attributes(&self) -> BTreeMap<String, String> {
        let mut out = self.attributes.clone();
        match schema_for_kind(&self.kind) {
            Some(schema) => {
                for (name, value) in schema.identity_attributes.iter().zip(self.identity.iter()) {
                    out.insert((*name).to_string(), value.clone());
                }
            }
            None => {
                for (i, value) in self.identity.iter().enumerate() {
                    out.insert(format!("identity{}", i), value.clone());
                }
            }
        }
        out
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.kind, self.identity.join("|"))
    }
}

/// An object of the intent model as exchanged between universes: either a
/// plain resource or a fault attached to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object")]
pub enum IntentObject {
    Resource(Resource),
    Fault(Fault),
}

impl IntentObject {
    pub fn object_identity(&self) -> ObjectIdentity {
        match self {
            IntentObject::Resource(res) => res.object_identity(),
            IntentObject::Fault(fault) => ObjectIdentity::new(
                "Fault",
                &[fault.external_identifier.clone(), fault.fault_code.clone()],
            ),
        }
    }
}

impl std::fmt::Display for IntentObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentObject::Resource(res) => write!(f, "{}", res),
            IntentObject::Fault(fault) => {
                write!(f, "Fault|{}|{}", fault.external_identifier, fault.fault_code)
            }
        }
    }
}
