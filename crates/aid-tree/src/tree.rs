use std::collections::{BTreeMap, HashMap};

use aid_domain::{ResourceKey, TenantId};
use sha2::{Digest, Sha256};

use crate::error::TreeError;

/// Per-tenant map of tree summaries, the exchange format between universes.
pub type HashTreeView = HashMap<TenantId, HashTree>;

/// Ordered key deltas between two trees.
///
/// `add` lists keys the receiver of [`HashTree::diff`] contains that the
/// argument lacks (or holds with different content); `remove` lists the
/// reverse. Applying `remove` then `add` to the argument yields a tree equal
/// to the receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub add: Vec<ResourceKey>,
    pub remove: Vec<ResourceKey>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Merkle-style summary of one tenant's resources.
///
/// Every node carries an optional *partial hash* covering its own content
/// (`None` marks a dummy, structure-only node) and a *full hash* folding the
/// partial hash with all child full hashes. Children are ordered, so hashes
/// and diffs are deterministic for a given pair of trees. Two trees are
/// value-equal iff their root full hashes match.
#[derive(Debug, Clone, Default)]
pub struct HashTree {
    root: Option<Node>,
}

#[derive(Debug, Clone)]
struct Node {
    segment: String,
    partial_hash: Option<String>,
    full_hash: String,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn new(segment: String) -> Self {
        let mut node = Node {
            segment,
            partial_hash: None,
            full_hash: String::new(),
            children: BTreeMap::new(),
        };
        node.recompute_full_hash();
        node
    }

    fn is_dummy(&self) -> bool {
        self.partial_hash.is_none()
    }

    fn recompute_full_hash(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.segment.as_bytes());
        hasher.update([0u8]);
        match &self.partial_hash {
            Some(partial) => hasher.update(partial.as_bytes()),
            None => hasher.update(b"dummy"),
        }
        for child in self.children.values() {
            hasher.update(child.full_hash.as_bytes());
        }
        self.full_hash = format!("{:x}", hasher.finalize());
    }

    fn insert(&mut self, rest: &[String], partial: String) {
        match rest.split_first() {
            None => self.partial_hash = Some(partial),
            Some((segment, tail)) => {
                let child = self
                    .children
                    .entry(segment.clone())
                    .or_insert_with(|| Node::new(segment.clone()));
                child.insert(tail, partial);
            }
        }
        self.recompute_full_hash();
    }

    /// Returns true when this node should be pruned from its parent.
    fn remove(&mut self, key: &ResourceKey, depth: usize) -> Result<bool, TreeError> {
        let segments = key.segments();
        if depth == segments.len() {
            if self.is_dummy() {
                return Err(TreeError::KeyNotFound(key.to_string()));
            }
            self.partial_hash = None;
        } else {
            let segment = &segments[depth];
            let child = self
                .children
                .get_mut(segment)
                .ok_or_else(|| TreeError::KeyNotFound(key.to_string()))?;
            if child.remove(key, depth + 1)? {
                self.children.remove(segment);
            }
        }
        self.recompute_full_hash();
        Ok(self.is_dummy() && self.children.is_empty())
    }

    fn find(&self, key: &ResourceKey, depth: usize) -> Option<&Node> {
        let segments = key.segments();
        if depth == segments.len() {
            return Some(self);
        }
        self.children
            .get(&segments[depth])
            .and_then(|child| child.find(key, depth + 1))
    }
}

/// Content hash of one resource's payload at a given key.
fn payload_hash(key: &ResourceKey, attributes: &BTreeMap<String, String>) -> String {
    let bytes = serde_json::to_vec(&(key.segments(), attributes)).unwrap_or_default();
    format!("{:x}", Sha256::digest(&bytes))
}

impl HashTree {
    pub fn new() -> Self {
        HashTree::default()
    }

    /// Stable fingerprint of the whole tree, `None` when empty.
    pub fn root_full_hash(&self) -> Option<&str> {
        self.root.as_ref().map(|n| n.full_hash.as_str())
    }

    /// No root at all: the tenant has no data in this view.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root exists but is a pruned placeholder with no content of its
    /// own. Distinct from [`is_empty`](Self::is_empty); deletion voting
    /// treats the two differently.
    pub fn has_dummy_root(&self) -> bool {
        self.root.as_ref().map(Node::is_dummy).unwrap_or(false)
    }

    /// Whether `key` names a populated (non-dummy) node.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        let Some(first) = key.segments().first() else {
            return false;
        };
        self.root
            .as_ref()
            .filter(|root| root.segment == *first)
            .and_then(|root| root.find(key, 1))
            .map(|node| !node.is_dummy())
            .unwrap_or(false)
    }

    /// Upsert the payload at `key`, creating dummy ancestors as needed.
    pub fn add(
        &mut self,
        key: &ResourceKey,
        attributes: &BTreeMap<String, String>,
    ) -> Result<(), TreeError> {
        let first = key.segments().first().ok_or(TreeError::EmptyKey)?;
        let partial = payload_hash(key, attributes);
        match self.root.as_mut() {
            Some(root) if root.segment == *first => {
                root.insert(&key.segments()[1..], partial);
                Ok(())
            }
            Some(root) => Err(TreeError::RootMismatch {
                key: key.to_string(),
                root: root.segment.clone(),
            }),
            None => {
                let mut root = Node::new(first.clone());
                root.insert(&key.segments()[1..], partial);
                self.root = Some(root);
                Ok(())
            }
        }
    }

    /// Drop the payload at `key`. A node with children degrades to dummy;
    /// trailing childless dummy nodes are pruned, so removing the last
    /// populated key leaves either a dummy root or an empty tree.
    pub fn remove(&mut self, key: &ResourceKey) -> Result<(), TreeError> {
        let first = key.segments().first().ok_or(TreeError::EmptyKey)?;
        match self.root.as_mut() {
            Some(root) if root.segment == *first => {
                if root.remove(key, 1)? {
                    self.root = None;
                }
                Ok(())
            }
            _ => Err(TreeError::KeyNotFound(key.to_string())),
        }
    }

    /// Keys to add to / remove from `other` so it would equal `self`.
    /// Subtrees with matching full hashes are skipped without descending.
    pub fn diff(&self, other: &HashTree) -> TreeDiff {
        let mut out = TreeDiff::default();
        let mut prefix = Vec::new();
        match (self.root.as_ref(), other.root.as_ref()) {
            (Some(mine), Some(theirs)) if mine.segment == theirs.segment => {
                diff_nodes(Some(mine), Some(theirs), &mut prefix, &mut out);
            }
            (mine, theirs) => {
                diff_nodes(mine, None, &mut prefix, &mut out);
                diff_nodes(None, theirs, &mut prefix, &mut out);
            }
        }
        out
    }
}

impl PartialEq for HashTree {
    fn eq(&self, other: &Self) -> bool {
        self.root_full_hash() == other.root_full_hash()
    }
}

impl Eq for HashTree {}

fn diff_nodes(
    mine: Option<&Node>,
    theirs: Option<&Node>,
    prefix: &mut Vec<String>,
    out: &mut TreeDiff,
) {
    if let (Some(m), Some(t)) = (mine, theirs) {
        if m.full_hash == t.full_hash {
            return;
        }
    }
    let segment = match (mine, theirs) {
        (Some(node), _) | (None, Some(node)) => node.segment.clone(),
        (None, None) => return,
    };
    prefix.push(segment);

    let mine_partial = mine.and_then(|n| n.partial_hash.as_deref());
    let theirs_partial = theirs.and_then(|n| n.partial_hash.as_deref());
    if mine_partial.is_some() && mine_partial != theirs_partial {
        out.add.push(ResourceKey::new(prefix.clone()));
    }
    if theirs_partial.is_some() && mine_partial.is_none() {
        out.remove.push(ResourceKey::new(prefix.clone()));
    }

    static EMPTY: BTreeMap<String, Node> = BTreeMap::new();
    let mine_children = mine.map(|n| &n.children).unwrap_or(&EMPTY);
    let theirs_children = theirs.map(|n| &n.children).unwrap_or(&EMPTY);
    let mut segments: Vec<&String> = mine_children.keys().chain(theirs_children.keys()).collect();
    segments.sort();
    segments.dedup();
    for segment in segments {
        diff_nodes(
            mine_children.get(segment),
            theirs_children.get(segment),
            prefix,
            out,
        );
    }
    prefix.pop();
}
