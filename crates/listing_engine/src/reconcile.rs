use std::sync::{Arc, Mutex, MutexGuard};

use listing_core::{FilterDomain, ParamBag};
use listing_logging::{listing_debug, listing_info};

use crate::navigation::{NavigateOptions, NavigationController};
use crate::store::FilterStore;

/// Single entry point for one listing page's filters.
///
/// Merges address-bar parameters, the shared store and its persisted defaults
/// into `current_filters`, and keeps the store and the address bar in step.
pub struct FilterReconciler<D: FilterDomain> {
    store: Arc<FilterStore>,
    navigation: Arc<dyn NavigationController>,
    // Address bar as last decoded; malformed values are reported once per navigation.
    decoded: Mutex<Option<(ParamBag, D::Patch)>>,
}

impl<D: FilterDomain> FilterReconciler<D> {
    /// First mount: fields present in the address bar override stored values
    /// for those fields only, and stay pinned against a later hydration.
    pub fn mount(store: Arc<FilterStore>, navigation: Arc<dyn NavigationController>) -> Self {
        let reconciler = Self {
            store,
            navigation,
            decoded: Mutex::new(None),
        };
        let deep_link = reconciler.address_bar();
        if deep_link != D::Patch::default() {
            listing_info!("Applying {} deep link: {:?}", D::NAME, deep_link);
            reconciler.store.dispatch(D::update_msg(deep_link));
        }
        reconciler
    }

    pub fn current_filters(&self) -> D::Filters {
        let state = self.store.state();
        D::merge(D::select(&state), &self.address_bar())
    }

    pub fn api_filters(&self) -> D::Api {
        D::project(&self.current_filters())
    }

    /// Store first, then the address bar, both before returning.
    pub fn handle_filter_change(&self, patch: D::Patch) {
        self.store.dispatch(D::update_msg(patch));
        self.sync_address_bar();
    }

    pub fn reset_filters(&self) {
        self.store.dispatch(D::reset_msg());
        self.sync_address_bar();
    }

    fn address_bar(&self) -> D::Patch {
        let params = self.navigation.current_params();
        let mut decoded = lock(&self.decoded);
        if let Some((seen, patch)) = decoded.as_ref() {
            if *seen == params {
                return patch.clone();
            }
        }
        let patch = D::decode(&params);
        *decoded = Some((params, patch.clone()));
        patch
    }

    fn sync_address_bar(&self) {
        let state = self.store.state();
        let current = self.navigation.current_params();
        let mut next = current.clone();
        next.replace_owned(D::PARAMS, D::encode(D::select(&state)));
        if next == current {
            return;
        }
        listing_debug!("Replacing {} address-bar params: {}", D::NAME, next.to_query_string());
        self.navigation
            .navigate(next, NavigateOptions { replace: true });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
