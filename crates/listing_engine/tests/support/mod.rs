#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use listing_core::{Cursor, FailureKind, FetchError, Page, SentinelRef};
use listing_engine::{PagedFetch, ViewportObserver, VisibilityCallback};
use tokio::sync::Semaphore;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

/// Lets spawned fetch tasks run up to their next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub filters: String,
    pub cursor: Option<String>,
    pub page_size: u32,
}

/// Serves numbered pages; cursor `p{n}` addresses page `n`.
pub struct ScriptedFetch {
    default_pages: Vec<Vec<u32>>,
    pages_by_filters: HashMap<String, Vec<Vec<u32>>>,
    fail_once_at: Mutex<HashSet<usize>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

impl ScriptedFetch {
    pub fn new(pages: Vec<Vec<u32>>) -> Self {
        Self {
            default_pages: pages,
            pages_by_filters: HashMap::new(),
            fail_once_at: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Requests wait until released with [`ScriptedFetch::release`].
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn with_pages_for(mut self, filters: impl Debug, pages: Vec<Vec<u32>>) -> Self {
        self.pages_by_filters.insert(format!("{filters:?}"), pages);
        self
    }

    pub fn failing_once_at(self, page_index: usize) -> Self {
        self.fail_once_at.lock().unwrap().insert(page_index);
        self
    }

    pub fn release(&self, requests: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(requests);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl<F: Debug + Sync> PagedFetch<F, u32> for ScriptedFetch {
    async fn fetch_page(
        &self,
        filters: &F,
        cursor: Option<&Cursor>,
        page_size: u32,
    ) -> Result<Page<u32>, FetchError> {
        let filters = format!("{filters:?}");
        self.calls.lock().unwrap().push(RecordedCall {
            filters: filters.clone(),
            cursor: cursor.map(|c| c.token().to_string()),
            page_size,
        });

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }

        let index = cursor
            .map(|c| c.token().trim_start_matches('p').parse::<usize>().expect("cursor"))
            .unwrap_or(0);
        if self.fail_once_at.lock().unwrap().remove(&index) {
            return Err(FetchError::new(FailureKind::Network, "connection reset"));
        }

        let pages = self
            .pages_by_filters
            .get(&filters)
            .unwrap_or(&self.default_pages);
        let items = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < pages.len()).then(|| Cursor::new(format!("p{}", index + 1)));
        Ok(Page { items, next_cursor })
    }
}

/// Viewport whose visibility reports are driven by the test.
#[derive(Default)]
pub struct FakeViewport {
    callbacks: Mutex<Vec<(SentinelRef, VisibilityCallback)>>,
    intersecting: AtomicBool,
    disconnects: AtomicUsize,
    observed: Mutex<Vec<SentinelRef>>,
}

impl FakeViewport {
    pub fn new(intersecting: bool) -> Self {
        let viewport = Self::default();
        viewport.set_intersecting(intersecting);
        viewport
    }

    pub fn set_intersecting(&self, intersecting: bool) {
        self.intersecting.store(intersecting, Ordering::SeqCst);
    }

    pub fn emit(&self, visible: bool) {
        self.set_intersecting(visible);
        let callbacks = self.callbacks.lock().unwrap().clone();
        for (_, callback) in callbacks {
            callback(visible);
        }
    }

    pub fn observing(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    pub fn observed(&self) -> Vec<SentinelRef> {
        self.observed.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl ViewportObserver for FakeViewport {
    fn observe(&self, sentinel: SentinelRef, on_visible: VisibilityCallback) {
        self.observed.lock().unwrap().push(sentinel);
        self.callbacks.lock().unwrap().push((sentinel, on_visible));
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.callbacks.lock().unwrap().clear();
    }

    fn is_intersecting(&self, _sentinel: SentinelRef) -> bool {
        self.intersecting.load(Ordering::SeqCst)
    }
}
