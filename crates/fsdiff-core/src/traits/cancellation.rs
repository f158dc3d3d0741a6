//! Cooperative stop signal for scans.
//!
//! The walker polls before each dispatch and workers poll before each job.
//! Nothing is interrupted mid-file; a stopped scan drains what is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    /// Ask every holder of this signal to stop. Idempotent.
    fn cancel(&self);
}

/// Shared stop flag. All clones observe the same state, so a caller can
/// keep one clone and hand another to a `Scanner`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arm after a cancelled run so the same scanner can scan again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}
