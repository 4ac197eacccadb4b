use std::sync::Arc;

use listing_core::{FilterDomain, FilterState, ListingView, PageKey};
use tokio::sync::watch;

use crate::coordinator::{FetchResult, PaginatedFetchCoordinator, SharedFetch};
use crate::fetch::PagedFetch;
use crate::navigation::NavigationController;
use crate::reconcile::FilterReconciler;
use crate::store::FilterStore;
use crate::viewport::{IntersectionTrigger, ViewportObserver};

/// One mounted listing page: filters, accumulated pages and the load-more trigger.
///
/// A filter edit updates store and address bar, then re-keys the coordinator,
/// which discards the old pages and refetches page one.
pub struct ListingSession<D: FilterDomain, T> {
    reconciler: FilterReconciler<D>,
    coordinator: PaginatedFetchCoordinator<D::Api, T>,
    trigger: IntersectionTrigger<D::Api, T>,
    changes: watch::Receiver<FilterState>,
    page_size: u32,
}

impl<D, T> ListingSession<D, T>
where
    D: FilterDomain,
    T: Clone + Send + Sync + 'static,
{
    /// Mounts the page and starts the first fetch. Requires a tokio runtime.
    pub fn mount(
        store: Arc<FilterStore>,
        navigation: Arc<dyn NavigationController>,
        fetcher: Arc<dyn PagedFetch<D::Api, T>>,
        observer: Arc<dyn ViewportObserver>,
        page_size: u32,
    ) -> Self {
        let mut changes = store.subscribe();
        let reconciler = FilterReconciler::<D>::mount(store, navigation);
        changes.mark_unchanged();
        let coordinator = PaginatedFetchCoordinator::new(fetcher);
        let trigger = IntersectionTrigger::new(observer, coordinator.clone());
        let session = Self {
            reconciler,
            coordinator,
            trigger,
            changes,
            page_size,
        };
        session.sync_key();
        session
    }

    pub fn current_filters(&self) -> D::Filters {
        self.reconciler.current_filters()
    }

    pub fn api_filters(&self) -> D::Api {
        self.reconciler.api_filters()
    }

    pub fn handle_filter_change(&mut self, patch: D::Patch) {
        self.reconciler.handle_filter_change(patch);
        self.changes.mark_unchanged();
        self.sync_key();
    }

    pub fn reset_filters(&mut self) {
        self.reconciler.reset_filters();
        self.changes.mark_unchanged();
        self.sync_key();
    }

    /// Picks up store changes made elsewhere (hydration, another page).
    /// Returns true when the fetch key changed.
    pub fn sync_with_store(&mut self) -> bool {
        if !self.changes.has_changed().unwrap_or(false) {
            return false;
        }
        self.changes.mark_unchanged();
        self.sync_key()
    }

    /// Renders the current listing and re-points the trigger at its last item.
    pub fn view(&self) -> ListingView<T> {
        let view = self.coordinator.view();
        self.trigger.attach(view.sentinel);
        view
    }

    pub fn fetch_next(&self) -> SharedFetch {
        self.coordinator.fetch_next()
    }

    pub fn retry(&self) -> SharedFetch {
        self.coordinator.retry()
    }

    pub async fn settled(&self) -> Option<FetchResult> {
        self.coordinator.settled().await
    }

    pub fn coordinator(&self) -> &PaginatedFetchCoordinator<D::Api, T> {
        &self.coordinator
    }

    fn sync_key(&self) -> bool {
        self.coordinator.set_key(PageKey {
            filters: self.reconciler.api_filters(),
            page_size: self.page_size,
        })
    }
}

impl<D: FilterDomain, T> Drop for ListingSession<D, T> {
    fn drop(&mut self) {
        self.trigger.detach();
        self.coordinator.clear();
    }
}
