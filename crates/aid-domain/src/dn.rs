//! Distinguished-name codec for the foreign model.
//!
//! A DN is `uni/` followed by one relative name per containment level, e.g.
//! `uni/tn-t1/BD-bd1/fault-F0123`. Relative names whose value contains `/`
//! are bracketed (`subnet-[10.0.0.0/24]`), matching the foreign controller's
//! escaping. Decomposition and construction form a stable bijection; the
//! fault-parent recovery path depends on it.

use crate::error::DomainError;
use crate::model::{schema_for_kind, schema_for_rn_prefix, FAULT_RN_PREFIX, FAULT_TYPE};
use crate::resource::Resource;

const DN_ROOT: &str = "uni";

fn rn_prefix_for(foreign_type: &str) -> Option<&'static str> {
    if foreign_type == FAULT_TYPE {
        return Some(FAULT_RN_PREFIX);
    }
    crate::model::schema_for_foreign(foreign_type).map(|s| s.rn_prefix)
}

fn foreign_type_for_prefix(prefix: &str) -> Option<&'static str> {
    if prefix == FAULT_RN_PREFIX {
        return Some(FAULT_TYPE);
    }
    schema_for_rn_prefix(prefix).map(|s| s.foreign_type)
}

/// Split the post-root part of a DN into relative names, honoring brackets.
fn split_rns(rest: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in rest.chars() {
        match ch {
            '/' if depth == 0 => out.push(std::mem::take(&mut current)),
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    out.push(current);
    out
}

fn unescape(name: &str) -> &str {
    name.strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name)
}

fn escape(name: &str) -> String {
    if name.contains('/') {
        format!("[{}]", name)
    } else {
        name.to_string()
    }
}

/// Decompose a DN into `(foreign_type, name)` segments, verifying that the
/// leaf segment has the expected type.
pub fn decompose_with_type(
    dn: &str,
    leaf_type: &str,
) -> Result<Vec<(String, String)>, DomainError> {
    let rest = dn
        .strip_prefix(DN_ROOT)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| DomainError::MalformedDn(dn.to_string()))?;
    let mut segments = Vec::new();
    for rn in split_rns(rest) {
        let (prefix, name) = rn
            .split_once('-')
            .ok_or_else(|| DomainError::MalformedDn(dn.to_string()))?;
        let ty = foreign_type_for_prefix(prefix)
            .ok_or_else(|| DomainError::MalformedDn(dn.to_string()))?;
        segments.push((ty.to_string(), unescape(name).to_string()));
    }
    match segments.last() {
        Some((ty, _)) if ty == leaf_type => Ok(segments),
        _ => Err(DomainError::MalformedDn(dn.to_string())),
    }
}

/// Rebuild a DN from `(foreign_type, name)` segments. Inverse of
/// [`decompose_with_type`].
pub fn build_dn(segments: &[(String, String)]) -> Result<String, DomainError> {
    let mut out = String::from(DN_ROOT);
    for (ty, name) in segments {
        let prefix =
            rn_prefix_for(ty).ok_or_else(|| DomainError::UnknownResourceType(ty.clone()))?;
        out.push('/');
        out.push_str(prefix);
        out.push('-');
        out.push_str(&escape(name));
    }
    Ok(out)
}

/// DN of an intent resource in the foreign model, via its schema key chain.
pub fn resource_dn(resource: &Resource) -> Result<String, DomainError> {
    let schema = schema_for_kind(&resource.kind)
        .ok_or_else(|| DomainError::UnknownResourceType(resource.kind.clone()))?;
    if resource.identity.len() != schema.key_types.len() {
        return Err(DomainError::IdentityArity {
            kind: resource.kind.clone(),
            expected: schema.key_types.len(),
            got: resource.identity.len(),
        });
    }
    let segments: Vec<(String, String)> = schema
        .key_types
        .iter()
        .zip(resource.identity.iter())
        .map(|(kind, id)| {
            let foreign = schema_for_kind(kind)
                .map(|s| s.foreign_type)
                .unwrap_or(kind);
            (foreign.to_string(), id.clone())
        })
        .collect();
    build_dn(&segments)
}

/// DN of a fault with the given code attached to `parent`; this is the
/// fault's `external_identifier`.
pub fn fault_dn(parent: &Resource, fault_code: &str) -> Result<String, DomainError> {
    let mut dn = resource_dn(parent)?;
    dn.push('/');
    dn.push_str(FAULT_RN_PREFIX);
    dn.push('-');
    dn.push_str(&escape(fault_code));
    Ok(dn)
}
