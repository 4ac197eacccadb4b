use std::sync::Mutex;

use listing_core::SentinelRef;
use listing_engine::{ViewportObserver, VisibilityCallback};

/// Headless viewport: printed output has no scroll position, so the sentinel
/// is always on screen and every newly rendered page asks for the next one.
#[derive(Default)]
pub struct TerminalViewport {
    observed: Mutex<Option<(SentinelRef, VisibilityCallback)>>,
}

impl TerminalViewport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ViewportObserver for TerminalViewport {
    fn observe(&self, sentinel: SentinelRef, on_visible: VisibilityCallback) {
        *self.observed.lock().unwrap_or_else(|e| e.into_inner()) = Some((sentinel, on_visible));
    }

    fn disconnect(&self) {
        self.observed.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn is_intersecting(&self, _sentinel: SentinelRef) -> bool {
        true
    }
}
