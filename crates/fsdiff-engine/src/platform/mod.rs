//! Platform helpers: descriptor limits and stat-derived metadata.

pub mod limits;
pub mod metadata;

pub use limits::raise_fd_limit;
pub use metadata::{portable_mode, StatMetadataProvider};
