//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "fsdiff=info,fsdiff_core=info,fsdiff_storage=info,fsdiff_engine=info";

/// Initialize the fsdiff logging system.
///
/// Reads `FSDIFF_LOG` for per-crate log levels, e.g.
/// `FSDIFF_LOG=fsdiff_engine=debug,fsdiff_storage=warn`.
/// Falls back to info level for the fsdiff crates when unset or invalid.
/// Output goes to stderr so stdout stays free for reports.
///
/// Idempotent: later calls are no-ops, and an already-installed global
/// subscriber is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .with(filter)
            .try_init();
    });
}
