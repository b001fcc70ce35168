use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use aid_domain::{dn, schema_for_kind, Fault, FaultSeverity, Resource, TenantId};

use crate::error::ConfigError;
use crate::raw::RawSnapshot;

/// One side's view of the world, loaded from a snapshot file: the resources
/// it holds plus the faults attached to them.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub resources: Vec<Resource>,
    pub faults: Vec<(Resource, Fault)>,
}

impl Snapshot {
    /// All tenants this snapshot mentions, sorted.
    pub fn tenants(&self) -> Vec<TenantId> {
        let mut out = BTreeSet::new();
        for resource in &self.resources {
            out.extend(resource.tenant());
        }
        for (parent, _) in &self.faults {
            out.extend(parent.tenant());
        }
        out.into_iter().collect()
    }
}

/// Load a snapshot file, validating every entry against the resource model.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw: RawSnapshot = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut snapshot = Snapshot::default();
    for entry in raw.resources {
        let schema = schema_for_kind(&entry.kind).ok_or_else(|| ConfigError::Invalid {
            path: path.display().to_string(),
            message: format!("unknown resource kind '{}'", entry.kind),
        })?;
        let mut resource = schema.resource_from_ids(&entry.identity)?;
        resource.attributes = entry.attributes;
        snapshot.resources.push(resource);
    }
    for entry in raw.faults {
        let schema = schema_for_kind(&entry.parent_kind).ok_or_else(|| ConfigError::Invalid {
            path: path.display().to_string(),
            message: format!("unknown resource kind '{}'", entry.parent_kind),
        })?;
        let parent = schema.resource_from_ids(&entry.parent_identity)?;
        let severity =
            FaultSeverity::parse(&entry.severity).ok_or_else(|| ConfigError::Invalid {
                path: path.display().to_string(),
                message: format!("unknown fault severity '{}'", entry.severity),
            })?;
        let fault = Fault::new(&entry.fault_code, dn::fault_dn(&parent, &entry.fault_code)?)
            .with_severity(severity)
            .with_description(entry.description);
        snapshot.faults.push((parent, fault));
    }
    debug!(
        resources = snapshot.resources.len(),
        faults = snapshot.faults.len(),
        "loaded snapshot from {}",
        path.display()
    );
    Ok(snapshot)
}
