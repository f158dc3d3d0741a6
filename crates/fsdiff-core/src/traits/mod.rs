//! Trait definitions at the seams between core, storage, and engine.

pub mod cancellation;
pub mod digest_source;
pub mod metadata;
pub mod sink;

pub use cancellation::{Cancellable, CancellationToken};
pub use digest_source::DigestSource;
pub use metadata::{FileMetadataProvider, NullMetadataProvider, PlatformFileInfo};
pub use sink::{RecordSink, VecSink};
