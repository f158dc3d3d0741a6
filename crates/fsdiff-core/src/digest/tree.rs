//! Hierarchical digest tree stored as an arena of nodes.
//!
//! Every record becomes a leaf under the directory node of its parent path.
//! A directory hash combines, in order, the hashes of its leaves (sorted by
//! full path) followed by its subdirectories (sorted by name). Parent and
//! child links are indices into the arena, never references.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use xxhash_rust::xxh3::Xxh3;

use super::root::feed_record;
use crate::errors::DigestError;
use crate::traits::DigestSource;
use crate::types::FxHashMap;

/// 128-bit node hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeHash(pub u128);

impl NodeHash {
    pub const ZERO: NodeHash = NodeHash(0);

    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Leaf hash of a single record.
    pub fn of_record<T: DigestSource + ?Sized>(record: &T) -> Self {
        let mut hasher = Xxh3::new();
        feed_record(&mut hasher, record);
        NodeHash(hasher.digest128())
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for NodeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        u128::from_str_radix(&hex, 16)
            .map(NodeHash)
            .map_err(serde::de::Error::custom)
    }
}

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Directory,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Record path for leaves; slash-joined components without a leading
    /// slash for directories (empty for the root).
    pub path: String,
    pub kind: NodeKind,
    pub hash: NodeHash,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtreeChange {
    Added,
    Deleted,
    Modified,
}

/// A directory whose subtree hash differs between two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeDifference {
    pub path: String,
    pub change: SubtreeChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSibling {
    pub hash: NodeHash,
    /// True when the sibling precedes the proven node in its parent.
    pub is_left: bool,
}

/// Siblings at one level, in parent child order with the proven node removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub siblings: Vec<ProofSibling>,
}

/// Inclusion proof for one record path, ordered leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub path: String,
    pub leaf_hash: NodeHash,
    pub root_hash: NodeHash,
    pub steps: Vec<ProofStep>,
}

impl InclusionProof {
    /// Recompute the root from the leaf and sibling hashes.
    pub fn verify(&self) -> bool {
        let mut current = self.leaf_hash;
        for step in &self.steps {
            let mut hasher = Xxh3::new();
            for sibling in step.siblings.iter().filter(|s| s.is_left) {
                hasher.update(&sibling.hash.to_bytes());
            }
            hasher.update(&current.to_bytes());
            for sibling in step.siblings.iter().filter(|s| !s.is_left) {
                hasher.update(&sibling.hash.to_bytes());
            }
            current = NodeHash(hasher.digest128());
        }
        current == self.root_hash
    }

    /// Verify the proof and that it was issued for exactly this record.
    pub fn verify_record<T: DigestSource + ?Sized>(&self, record: &T) -> bool {
        record.path() == self.path && NodeHash::of_record(record) == self.leaf_hash && self.verify()
    }
}

#[derive(Default)]
struct PendingDir {
    files: Vec<(String, NodeHash)>,
    children: BTreeMap<String, usize>,
}

/// Arena-backed hierarchical digest tree.
#[derive(Debug, Clone, Default)]
pub struct DigestTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
    leaves: FxHashMap<String, NodeId>,
    directories: FxHashMap<String, NodeId>,
    depth: usize,
}

impl DigestTree {
    /// Build the tree from a record set. An empty set yields an empty tree.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator,
        I::Item: DigestSource,
    {
        let mut pending = vec![PendingDir::default()];
        let mut count = 0usize;

        for record in records {
            count += 1;
            let hash = NodeHash::of_record(&record);
            let mut current = 0;
            let mut parts = record
                .path()
                .split('/')
                .filter(|part| !part.is_empty())
                .peekable();
            while let Some(part) = parts.next() {
                if parts.peek().is_none() {
                    break;
                }
                let existing = pending[current].children.get(part).copied();
                current = match existing {
                    Some(index) => index,
                    None => {
                        let index = pending.len();
                        pending.push(PendingDir::default());
                        pending[current].children.insert(part.to_string(), index);
                        index
                    }
                };
            }
            pending[current].files.push((record.path().to_string(), hash));
        }

        let mut tree = Self::default();
        if count > 0 {
            let root = tree.materialize(&mut pending, 0, String::new(), None, 1);
            tree.root = Some(root);
        }
        tree
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn materialize(
        &mut self,
        pending: &mut [PendingDir],
        index: usize,
        path: String,
        parent: Option<NodeId>,
        level: usize,
    ) -> NodeId {
        let id = self.push(TreeNode {
            path: path.clone(),
            kind: NodeKind::Directory,
            hash: NodeHash::ZERO,
            parent,
            children: Vec::new(),
        });
        self.depth = self.depth.max(level);

        let mut files = std::mem::take(&mut pending[index].files);
        files.sort_by(|a, b| a.0.cmp(&b.0));
        let subdirs = std::mem::take(&mut pending[index].children);

        let mut hasher = Xxh3::new();
        let mut children = Vec::with_capacity(files.len() + subdirs.len());

        for (file_path, hash) in files {
            hasher.update(&hash.to_bytes());
            let leaf = self.push(TreeNode {
                path: file_path.clone(),
                kind: NodeKind::Leaf,
                hash,
                parent: Some(id),
                children: Vec::new(),
            });
            self.leaves.insert(file_path, leaf);
            children.push(leaf);
            self.depth = self.depth.max(level + 1);
        }

        for (name, child_index) in subdirs {
            let child_path = if path.is_empty() {
                name
            } else {
                format!("{path}/{name}")
            };
            let child = self.materialize(pending, child_index, child_path, Some(id), level + 1);
            hasher.update(&self.nodes[child].hash.to_bytes());
            children.push(child);
        }

        self.nodes[id].hash = NodeHash(hasher.digest128());
        self.nodes[id].children = children;
        if !path.is_empty() {
            self.directories.insert(path, id);
        }
        id
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total nodes, leaves and directories.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of levels from the root to the deepest leaf; 0 when empty.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.map(|id| &self.nodes[id])
    }

    pub fn root_hash(&self) -> NodeHash {
        self.root().map(|node| node.hash).unwrap_or(NodeHash::ZERO)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Combined hash of everything below `dir` (`""` or `"/"` is the root).
    pub fn subtree_hash(&self, dir: &str) -> Option<NodeHash> {
        let key = dir.trim_matches('/');
        if key.is_empty() {
            return self.root().map(|node| node.hash);
        }
        self.directories.get(key).map(|&id| self.nodes[id].hash)
    }

    fn combine(&self, children: &[NodeId]) -> NodeHash {
        let mut hasher = Xxh3::new();
        for &child in children {
            hasher.update(&self.nodes[child].hash.to_bytes());
        }
        NodeHash(hasher.digest128())
    }

    /// Check that the root is present and non-zero, every node is reachable
    /// from it, child links agree with parent links, and every directory
    /// hash matches its children.
    pub fn verify_integrity(&self) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if self.nodes[root].hash == NodeHash::ZERO || self.nodes[root].parent.is_some() {
            return false;
        }

        let mut reached = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reached += 1;
            let node = &self.nodes[id];
            match node.kind {
                NodeKind::Leaf => {
                    if !node.children.is_empty() {
                        return false;
                    }
                }
                NodeKind::Directory => {
                    if node.children.iter().any(|&c| self.nodes[c].parent != Some(id)) {
                        return false;
                    }
                    if self.combine(&node.children) != node.hash {
                        return false;
                    }
                    stack.extend(node.children.iter().copied());
                }
            }
        }
        reached == self.nodes.len()
    }

    /// Inclusion proof for the record stored at `path`.
    pub fn get_proof(&self, path: &str) -> Result<InclusionProof, DigestError> {
        let root = self.root.ok_or(DigestError::EmptyTree)?;
        let leaf = *self
            .leaves
            .get(path)
            .ok_or_else(|| DigestError::PathNotFound {
                path: path.to_string(),
            })?;

        let mut steps = Vec::new();
        let mut current = leaf;
        while let Some(parent) = self.nodes[current].parent {
            let mut seen = false;
            let mut siblings = Vec::new();
            for &child in &self.nodes[parent].children {
                if child == current {
                    seen = true;
                    continue;
                }
                siblings.push(ProofSibling {
                    hash: self.nodes[child].hash,
                    is_left: !seen,
                });
            }
            steps.push(ProofStep { siblings });
            current = parent;
        }

        Ok(InclusionProof {
            path: path.to_string(),
            leaf_hash: self.nodes[leaf].hash,
            root_hash: self.nodes[root].hash,
            steps,
        })
    }

    /// Directory-level differences, sorted by path. Lets callers narrow a
    /// record comparison to the subtrees that actually changed.
    pub fn diff_subtrees(&self, other: &DigestTree) -> Vec<SubtreeDifference> {
        let mut out = Vec::new();
        for (path, &id) in &self.directories {
            match other.directories.get(path) {
                None => out.push(SubtreeDifference {
                    path: path.clone(),
                    change: SubtreeChange::Deleted,
                }),
                Some(&other_id) if other.nodes[other_id].hash != self.nodes[id].hash => {
                    out.push(SubtreeDifference {
                        path: path.clone(),
                        change: SubtreeChange::Modified,
                    })
                }
                Some(_) => {}
            }
        }
        for path in other.directories.keys() {
            if !self.directories.contains_key(path) {
                out.push(SubtreeDifference {
                    path: path.clone(),
                    change: SubtreeChange::Added,
                });
            }
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }
}
