//! Tests for the event dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fsdiff_core::events::*;

#[derive(Default)]
struct Counter {
    completes: AtomicUsize,
    errors: AtomicUsize,
}

impl ScanEventHandler for Counter {
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {
        self.completes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_scan_error(&self, _event: &ScanErrorEvent) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

struct Panicker;

impl ScanEventHandler for Panicker {
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {
        panic!("handler failure");
    }
}

fn complete_event() -> ScanCompleteEvent {
    ScanCompleteEvent {
        file_count: 1,
        dir_count: 1,
        total_size: 2,
        error_count: 0,
        duration: Duration::from_millis(5),
    }
}

#[test]
fn empty_dispatcher_is_a_no_op() {
    let dispatcher = EventDispatcher::new();
    assert_eq!(dispatcher.handler_count(), 0);
    dispatcher.emit_scan_complete(&complete_event());
}

#[test]
fn every_handler_receives_events() {
    let a = Arc::new(Counter::default());
    let b = Arc::new(Counter::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(a.clone());
    dispatcher.register(b.clone());

    dispatcher.emit_scan_complete(&complete_event());
    dispatcher.emit_scan_error(&ScanErrorEvent {
        path: "/x".into(),
        message: "denied".to_string(),
    });

    assert_eq!(a.completes.load(Ordering::SeqCst), 1);
    assert_eq!(b.completes.load(Ordering::SeqCst), 1);
    assert_eq!(a.errors.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_handler_does_not_block_later_handlers() {
    let counter = Arc::new(Counter::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(Panicker));
    dispatcher.register(counter.clone());

    dispatcher.emit_scan_complete(&complete_event());
    assert_eq!(counter.completes.load(Ordering::SeqCst), 1);
}
