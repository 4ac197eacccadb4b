//! Listing engine: persistence, navigation, paged fetching and their drivers.
mod config;
mod coordinator;
mod fetch;
mod navigation;
mod persistence;
mod reconcile;
mod session;
mod storage;
mod store;
mod viewport;

pub use config::{FetchSettings, ListingConfig};
pub use coordinator::{FetchOutcome, FetchResult, PaginatedFetchCoordinator, SharedFetch};
pub use fetch::{PagedFetch, ReqwestPagedFetch};
pub use navigation::{MemoryNavigation, NavigateOptions, NavigationController};
pub use persistence::{PersistenceAdapter, PersistenceHandle};
pub use reconcile::FilterReconciler;
pub use session::ListingSession;
pub use storage::{
    ensure_state_dir, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistError,
};
pub use store::FilterStore;
pub use viewport::{IntersectionTrigger, ViewportObserver, VisibilityCallback};
