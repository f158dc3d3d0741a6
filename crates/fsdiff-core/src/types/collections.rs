//! Re-exports of performance-oriented collection types.

pub use rustc_hash::FxHashMap;
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for per-record change tags (rarely more than 4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;
