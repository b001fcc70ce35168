use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An object in the foreign (controller wire) model: a type tag plus a flat
/// attribute map. Every foreign object carries a `dn` attribute, the foreign
/// model's canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignObject {
    pub type_tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ForeignObject {
    pub fn new(type_tag: impl Into<String>, dn: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("dn".to_string(), dn.into());
        ForeignObject {
            type_tag: type_tag.into(),
            attributes,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn dn(&self) -> Option<&str> {
        self.attributes.get("dn").map(String::as_str)
    }
}

impl std::fmt::Display for ForeignObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.type_tag, self.dn().unwrap_or("<no dn>"))
    }
}
