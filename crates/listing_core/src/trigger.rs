//! Visibility bookkeeping for the "load more" sentinel.

/// Opaque handle identifying the node attached to the last rendered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelRef {
    epoch: u64,
    index: usize,
}

impl SentinelRef {
    pub(crate) fn new(epoch: u64, index: usize) -> Self {
        Self { epoch, index }
    }
}

/// Coordinator facts the trigger consults before firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchGate {
    pub has_next_page: bool,
    pub is_fetching_next_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerState {
    sentinel: Option<SentinelRef>,
    visible: bool,
}

impl TriggerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentinel(&self) -> Option<SentinelRef> {
        self.sentinel
    }

    /// Returns true when the observed node changed and must be re-observed.
    pub fn attach(&mut self, sentinel: Option<SentinelRef>) -> bool {
        if self.sentinel == sentinel {
            return false;
        }
        self.sentinel = sentinel;
        self.visible = false;
        true
    }

    pub fn detach(&mut self) {
        self.sentinel = None;
        self.visible = false;
    }

    /// Records a visibility report and returns true when a fetch should start.
    ///
    /// Fires only on a hidden-to-visible transition of the current sentinel.
    pub fn on_visibility(&mut self, sentinel: SentinelRef, visible: bool, gate: FetchGate) -> bool {
        if self.sentinel != Some(sentinel) {
            return false;
        }
        let entered = visible && !self.visible;
        self.visible = visible;
        entered && gate.has_next_page && !gate.is_fetching_next_page
    }
}
