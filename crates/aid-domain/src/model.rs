use crate::error::DomainError;
use crate::key::ResourceKey;
use crate::resource::Resource;

/// Type tag of fault records, both as the leaf type of operational tree keys
/// and as the wire tag of fault objects in the foreign model.
pub const FAULT_TYPE: &str = "faultInst";

/// Relative-name prefix of fault segments in a DN.
pub const FAULT_RN_PREFIX: &str = "fault";

/// Static description of a managed resource kind.
///
/// `identity_attributes` are ordered and positional: the n-th identity value
/// of a [`Resource`] carries the n-th attribute here. `key_types` is the
/// root-to-leaf chain of kinds whose relative names form the tenant tree key;
/// it always starts at `Tenant` and has the same arity as the identity.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSchema {
    pub kind: &'static str,
    pub foreign_type: &'static str,
    pub rn_prefix: &'static str,
    pub identity_attributes: &'static [&'static str],
    pub key_types: &'static [&'static str],
}

const SCHEMAS: &[ResourceSchema] = &[
    ResourceSchema {
        kind: "Tenant",
        foreign_type: "fvTenant",
        rn_prefix: "tn",
        identity_attributes: &["name"],
        key_types: &["Tenant"],
    },
    ResourceSchema {
        kind: "VrfContext",
        foreign_type: "fvCtx",
        rn_prefix: "ctx",
        identity_attributes: &["tenant_name", "name"],
        key_types: &["Tenant", "VrfContext"],
    },
    ResourceSchema {
        kind: "BridgeDomain",
        foreign_type: "fvBD",
        rn_prefix: "BD",
        identity_attributes: &["tenant_name", "name"],
        key_types: &["Tenant", "BridgeDomain"],
    },
    ResourceSchema {
        kind: "Subnet",
        foreign_type: "fvSubnet",
        rn_prefix: "subnet",
        identity_attributes: &["tenant_name", "bd_name", "gw_ip"],
        key_types: &["Tenant", "BridgeDomain", "Subnet"],
    },
];

pub fn schema_for_kind(kind: &str) -> Option<&'static ResourceSchema> {
    SCHEMAS.iter().find(|s| s.kind == kind)
}

pub fn schema_for_foreign(type_tag: &str) -> Option<&'static ResourceSchema> {
    SCHEMAS.iter().find(|s| s.foreign_type == type_tag)
}

pub fn schema_for_rn_prefix(prefix: &str) -> Option<&'static ResourceSchema> {
    SCHEMAS.iter().find(|s| s.rn_prefix == prefix)
}

impl ResourceSchema {
    /// Build an identity-only resource from positional key ids.
    pub fn resource_from_ids(&self, ids: &[String]) -> Result<Resource, DomainError> {
        if ids.len() != self.identity_attributes.len() {
            return Err(DomainError::IdentityArity {
                kind: self.kind.to_string(),
                expected: self.identity_attributes.len(),
                got: ids.len(),
            });
        }
        Ok(Resource::new(self.kind, ids.to_vec()))
    }

    /// The tenant tree key of a resource of this kind.
    pub fn tree_key(&self, resource: &Resource) -> Result<ResourceKey, DomainError> {
        if resource.identity.len() != self.key_types.len() {
            return Err(DomainError::IdentityArity {
                kind: self.kind.to_string(),
                expected: self.key_types.len(),
                got: resource.identity.len(),
            });
        }
        let segments = self
            .key_types
            .iter()
            .zip(resource.identity.iter())
            .map(|(ty, id)| format!("{}|{}", ty, id))
            .collect();
        Ok(ResourceKey::new(segments))
    }
}

/// Tree key of a resource, resolving its schema first.
pub fn tree_key_for(resource: &Resource) -> Result<ResourceKey, DomainError> {
    let schema = schema_for_kind(&resource.kind)
        .ok_or_else(|| DomainError::UnknownResourceType(resource.kind.clone()))?;
    schema.tree_key(resource)
}

/// Operational-tree key of a fault attached to `parent_key`.
pub fn fault_tree_key(parent_key: &ResourceKey, fault_code: &str) -> ResourceKey {
    parent_key.child(format!("{}|{}", FAULT_TYPE, fault_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_key_chain_spans_three_levels() {
        let res = Resource::new(
            "Subnet",
            vec!["t1".to_string(), "bd1".to_string(), "10.0.0.1".to_string()],
        );
        let key = tree_key_for(&res).unwrap();
        assert_eq!(
            key.segments(),
            &["Tenant|t1", "BridgeDomain|bd1", "Subnet|10.0.0.1"]
        );
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let res = Resource::new("FlubberDomain", vec!["t1".to_string()]);
        assert!(matches!(
            tree_key_for(&res),
            Err(DomainError::UnknownResourceType(_))
        ));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let res = Resource::new("BridgeDomain", vec!["t1".to_string()]);
        assert!(matches!(
            tree_key_for(&res),
            Err(DomainError::IdentityArity { .. })
        ));
    }
}
