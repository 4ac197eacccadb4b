use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use listing_core::{
    Completion, FetchError, FetchGate, FetchPhase, ListingView, PageKey, PageRequest, Pagination,
    SentinelRef,
};
use listing_logging::{listing_debug, listing_info, listing_warn};

use crate::fetch::PagedFetch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Appended {
        page_index: usize,
        item_count: usize,
        has_next_page: bool,
    },
    /// No further pages; nothing was requested.
    Exhausted,
    /// The key changed while the request was outstanding; the page was dropped.
    Discarded,
    /// No key has been set yet.
    Idle,
}

pub type FetchResult = Result<FetchOutcome, FetchError>;

/// A fetch every concurrent caller can await; all of them observe one result.
pub type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct Inner<F, T> {
    pagination: Pagination<F, T>,
    in_flight: Option<SharedFetch>,
}

/// Accumulates pages for one (filters, page size) key.
///
/// The pagination state machine is the only admission control: while a
/// request is outstanding, `fetch_next` hands back that same request.
pub struct PaginatedFetchCoordinator<F, T> {
    inner: Arc<Mutex<Inner<F, T>>>,
    fetcher: Arc<dyn PagedFetch<F, T>>,
}

impl<F, T> Clone for PaginatedFetchCoordinator<F, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F, T> PaginatedFetchCoordinator<F, T>
where
    F: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn PagedFetch<F, T>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                pagination: Pagination::new(),
                in_flight: None,
            })),
            fetcher,
        }
    }

    /// Switches the key. A different key discards every page and the cursor,
    /// then starts the first page. Returns whether the key changed.
    pub fn set_key(&self, key: PageKey<F>) -> bool {
        {
            let mut inner = lock(&self.inner);
            if !inner.pagination.set_key(key) {
                return false;
            }
            inner.in_flight = None;
        }
        listing_debug!("Fetch key changed; accumulator reset");
        let _first_page = self.fetch_next();
        true
    }

    /// Requests the next page, or joins the request already outstanding.
    ///
    /// Must be called inside a tokio runtime: the request runs on a spawned
    /// task so it completes even if no caller awaits it.
    pub fn fetch_next(&self) -> SharedFetch {
        let mut inner = lock(&self.inner);
        if let Some(in_flight) = &inner.in_flight {
            listing_debug!("Fetch already in flight; joining it");
            return in_flight.clone();
        }

        let Some(request) = inner.pagination.begin_fetch() else {
            let outcome = match inner.pagination.phase() {
                FetchPhase::Exhausted => FetchOutcome::Exhausted,
                _ => FetchOutcome::Idle,
            };
            return future::ready::<FetchResult>(Ok(outcome)).boxed().shared();
        };

        listing_debug!(
            "Requesting page {} (epoch {})",
            inner.pagination.page_count() + 1,
            request.epoch()
        );
        let fetch = run_request(Arc::clone(&self.inner), Arc::clone(&self.fetcher), request)
            .boxed()
            .shared();
        inner.in_flight = Some(fetch.clone());
        tokio::spawn(fetch.clone());
        fetch
    }

    /// Re-issues the failed request from the last good cursor.
    pub fn retry(&self) -> SharedFetch {
        self.fetch_next()
    }

    /// Resolves the outstanding request, if any.
    pub async fn settled(&self) -> Option<FetchResult> {
        let in_flight = lock(&self.inner).in_flight.clone();
        match in_flight {
            Some(fetch) => Some(fetch.await),
            None => None,
        }
    }

    pub fn phase(&self) -> FetchPhase {
        lock(&self.inner).pagination.phase()
    }

    pub fn has_next_page(&self) -> bool {
        lock(&self.inner).pagination.has_next_page()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        lock(&self.inner).pagination.is_fetching_next_page()
    }

    pub fn error(&self) -> Option<FetchError> {
        lock(&self.inner).pagination.error().cloned()
    }

    pub fn page_count(&self) -> usize {
        lock(&self.inner).pagination.page_count()
    }

    pub fn sentinel(&self) -> Option<SentinelRef> {
        lock(&self.inner).pagination.sentinel()
    }

    pub fn gate(&self) -> FetchGate {
        let inner = lock(&self.inner);
        FetchGate {
            has_next_page: inner.pagination.has_next_page(),
            is_fetching_next_page: inner.pagination.is_fetching_next_page(),
        }
    }

    pub fn view(&self) -> ListingView<T>
    where
        T: Clone,
    {
        ListingView::from(&lock(&self.inner).pagination)
    }
}

impl<F: Clone + PartialEq, T> PaginatedFetchCoordinator<F, T> {
    /// Unmount: forget the key and all pages. Late responses are discarded.
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.pagination.clear();
        inner.in_flight = None;
    }
}

async fn run_request<F, T>(
    inner: Arc<Mutex<Inner<F, T>>>,
    fetcher: Arc<dyn PagedFetch<F, T>>,
    request: PageRequest<F>,
) -> FetchResult
where
    F: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    let result = fetcher
        .fetch_page(&request.key.filters, request.cursor.as_ref(), request.key.page_size)
        .await;
    apply_result(&inner, &request, result)
}

fn apply_result<F, T>(
    inner: &Mutex<Inner<F, T>>,
    request: &PageRequest<F>,
    result: Result<listing_core::Page<T>, FetchError>,
) -> FetchResult
where
    F: Clone + PartialEq,
{
    let mut inner = lock(inner);
    if inner.pagination.is_current(request) {
        inner.in_flight = None;
    }
    match inner.pagination.complete(request, result) {
        Completion::Appended {
            page_index,
            item_count,
            has_next_page,
        } => {
            listing_info!(
                "Appended page {} with {} items (more: {})",
                page_index + 1,
                item_count,
                has_next_page
            );
            Ok(FetchOutcome::Appended {
                page_index,
                item_count,
                has_next_page,
            })
        }
        Completion::Failed(err) => {
            listing_warn!("Page fetch failed; accumulated pages kept: {}", err);
            Err(err)
        }
        Completion::Discarded => {
            listing_debug!("Discarding stale page from epoch {}", request.epoch());
            Ok(FetchOutcome::Discarded)
        }
    }
}

fn lock<F, T>(inner: &Mutex<Inner<F, T>>) -> MutexGuard<'_, Inner<F, T>> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}
