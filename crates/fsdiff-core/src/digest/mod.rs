//! Content-integrity summaries over a record set.
//!
//! `RootDigest` is the flat, order-independent XOR fold used for fast
//! snapshot equality. `DigestTree` is the hierarchical mode: per-directory
//! combined hashes stored in an arena, with subtree comparison and
//! inclusion proofs. Neither is a cryptographic commitment.

pub mod root;
pub mod tree;

pub use root::{digest, record_hash, RollingDigest, RootDigest};
pub use tree::{
    DigestTree, InclusionProof, NodeHash, NodeId, NodeKind, ProofSibling, ProofStep,
    SubtreeChange, SubtreeDifference, TreeNode,
};
