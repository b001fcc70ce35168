//! Foreign-to-intent model conversion.
//!
//! `convert` is pure: zero or more intent objects out per foreign object in.
//! Objects that cannot be expressed in the intent model convert to nothing.

use tracing::debug;

use crate::dn::decompose_with_type;
use crate::error::DomainError;
use crate::foreign::ForeignObject;
use crate::model::{schema_for_foreign, FAULT_TYPE};
use crate::resource::{IntentObject, Resource};
use crate::status::{Fault, FaultSeverity};

pub fn convert(items: &[ForeignObject]) -> Vec<IntentObject> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match convert_one(item) {
            Ok(Some(object)) => out.push(object),
            Ok(None) => debug!(item = %item, "no intent counterpart for foreign type"),
            Err(err) => debug!(item = %item, error = %err, "skipping unconvertible foreign object"),
        }
    }
    out
}

fn convert_one(item: &ForeignObject) -> Result<Option<IntentObject>, DomainError> {
    let dn = item
        .dn()
        .ok_or_else(|| DomainError::MalformedDn(format!("{} without dn", item.type_tag)))?;

    if item.type_tag == FAULT_TYPE {
        let decomposed = decompose_with_type(dn, FAULT_TYPE)?;
        let code = item
            .attributes
            .get("code")
            .cloned()
            .or_else(|| decomposed.last().map(|(_, name)| name.clone()))
            .ok_or_else(|| DomainError::MalformedDn(dn.to_string()))?;
        let severity = item
            .attributes
            .get("severity")
            .and_then(|s| FaultSeverity::parse(s))
            .unwrap_or(FaultSeverity::Warning);
        let description = item.attributes.get("descr").cloned().unwrap_or_default();
        let fault = Fault::new(code, dn)
            .with_severity(severity)
            .with_description(description);
        return Ok(Some(IntentObject::Fault(fault)));
    }

    let Some(schema) = schema_for_foreign(&item.type_tag) else {
        return Ok(None);
    };
    let decomposed = decompose_with_type(dn, &item.type_tag)?;
    let ids: Vec<String> = decomposed.into_iter().map(|(_, name)| name).collect();
    if ids.len() != schema.identity_attributes.len() {
        return Err(DomainError::IdentityArity {
            kind: schema.kind.to_string(),
            expected: schema.identity_attributes.len(),
            got: ids.len(),
        });
    }
    let mut resource = Resource::new(schema.kind, ids);
    for (name, value) in &item.attributes {
        if name != "dn" {
            resource.attributes.insert(name.clone(), value.clone());
        }
    }
    Ok(Some(IntentObject::Resource(resource)))
}
