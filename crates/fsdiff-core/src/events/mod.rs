//! Scan and diff lifecycle events.
//! Handlers are registered on an `EventDispatcher` owned by the caller.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::ScanEventHandler;
pub use types::*;
