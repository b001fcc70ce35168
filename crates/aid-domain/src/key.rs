use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Path of a single resource inside a tenant tree.
///
/// Segments run root-first; each one is `"type|id0|id1|…"`. The full identity
/// of the leaf resource is gathered across every segment in order, so the key
/// `["Tenant|t1", "BridgeDomain|bd1"]` dissects to
/// `("BridgeDomain", ["t1", "bd1"])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(Vec<String>);

/// Dissection result: the leaf type plus the identity ids of every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DissectedKey {
    pub kind: String,
    pub ids: Vec<String>,
}

impl ResourceKey {
    pub fn new(segments: Vec<String>) -> Self {
        ResourceKey(segments)
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourceKey(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Type tag of the leaf segment (the part before the first `|`).
    pub fn leaf_type(&self) -> Option<&str> {
        self.leaf().and_then(|s| s.split('|').next())
    }

    /// The same key minus its leaf segment.
    pub fn without_leaf(&self) -> ResourceKey {
        let mut segments = self.0.clone();
        segments.pop();
        ResourceKey(segments)
    }

    /// The key extended by one child segment.
    pub fn child(&self, segment: impl Into<String>) -> ResourceKey {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        ResourceKey(segments)
    }

    /// Split the key into the leaf type and the identity ids gathered across
    /// all segments, leaf type taken from the last segment.
    pub fn dissect(&self) -> Result<DissectedKey, DomainError> {
        let leaf = self
            .leaf()
            .ok_or_else(|| DomainError::MalformedKey(self.to_string()))?;
        let kind = match leaf.split_once('|') {
            Some((ty, _)) if !ty.is_empty() => ty.to_string(),
            _ => return Err(DomainError::MalformedKey(self.to_string())),
        };
        let mut ids = Vec::with_capacity(self.0.len());
        for segment in &self.0 {
            let mut parts = segment.split('|');
            let ty = parts.next().unwrap_or_default();
            let rest: Vec<&str> = parts.collect();
            if ty.is_empty() || rest.is_empty() {
                return Err(DomainError::MalformedKey(self.to_string()));
            }
            ids.extend(rest.into_iter().map(str::to_string));
        }
        Ok(DissectedKey { kind, ids })
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
