use std::sync::{Arc, Mutex, MutexGuard};

use listing_core::{SentinelRef, TriggerState};
use listing_logging::listing_debug;

use crate::coordinator::PaginatedFetchCoordinator;

pub type VisibilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Visibility detection supplied by the presentation layer.
pub trait ViewportObserver: Send + Sync {
    /// Reports visibility changes of `sentinel` through `on_visible`.
    fn observe(&self, sentinel: SentinelRef, on_visible: VisibilityCallback);
    fn disconnect(&self);
    /// Immediate bounding-rect check against the viewport.
    fn is_intersecting(&self, sentinel: SentinelRef) -> bool;
}

/// Turns sentinel visibility into `fetch_next` calls, once per enter transition.
pub struct IntersectionTrigger<F, T> {
    observer: Arc<dyn ViewportObserver>,
    coordinator: PaginatedFetchCoordinator<F, T>,
    state: Arc<Mutex<TriggerState>>,
}

impl<F, T> IntersectionTrigger<F, T>
where
    F: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(
        observer: Arc<dyn ViewportObserver>,
        coordinator: PaginatedFetchCoordinator<F, T>,
    ) -> Self {
        Self {
            observer,
            coordinator,
            state: Arc::new(Mutex::new(TriggerState::new())),
        }
    }

    /// Points the trigger at the node after the last rendered item.
    ///
    /// Re-observes only when the identity changed.
    pub fn attach(&self, sentinel: Option<SentinelRef>) {
        if !lock(&self.state).attach(sentinel) {
            return;
        }
        self.observer.disconnect();
        let Some(sentinel) = sentinel else {
            return;
        };

        let callback = self.callback(sentinel);
        self.observer.observe(sentinel, Arc::clone(&callback));
        // Content shorter than the viewport never produces a transition event.
        callback(self.observer.is_intersecting(sentinel));
    }

    fn callback(&self, sentinel: SentinelRef) -> VisibilityCallback {
        let state = Arc::clone(&self.state);
        let coordinator = self.coordinator.clone();
        Arc::new(move |visible| {
            let gate = coordinator.gate();
            let fire = lock(&state).on_visibility(sentinel, visible, gate);
            if fire {
                listing_debug!("Sentinel entered viewport; fetching next page");
                let _next_page = coordinator.fetch_next();
            }
        })
    }
}

impl<F, T> IntersectionTrigger<F, T> {
    pub fn detach(&self) {
        lock(&self.state).detach();
        self.observer.disconnect();
    }
}

impl<F, T> Drop for IntersectionTrigger<F, T> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn lock(state: &Mutex<TriggerState>) -> MutexGuard<'_, TriggerState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
