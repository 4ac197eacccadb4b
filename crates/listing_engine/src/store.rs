use std::sync::Mutex;

use listing_core::{
    update, ChannelFilters, ChannelFiltersPatch, Effect, FilterState, GiftFilters,
    GiftFiltersPatch, Msg, PersistedFilterPatch,
};
use listing_logging::{listing_debug, listing_info};
use tokio::sync::watch;

use crate::persistence::{PersistenceAdapter, PersistenceHandle};

/// Shared canonical filter state.
///
/// Mutations apply synchronously; persistence runs afterwards as a
/// fire-and-forget effect, starting with hydration so the stored snapshot is
/// read before anything overwrites it. Subscribers observe changes through a
/// watch channel.
pub struct FilterStore {
    state: watch::Sender<FilterState>,
    adapter: Option<PersistenceAdapter>,
    persistence: Mutex<Option<PersistenceHandle>>,
}

impl FilterStore {
    /// A store that never touches durable storage.
    pub fn in_memory() -> Self {
        Self {
            state: watch::Sender::new(FilterState::new()),
            adapter: None,
            persistence: Mutex::new(None),
        }
    }

    /// Must be called inside a tokio runtime: spawns the persistence writer.
    pub fn with_persistence(adapter: PersistenceAdapter) -> Self {
        let handle = PersistenceHandle::spawn(adapter.clone());
        Self {
            state: watch::Sender::new(FilterState::new()),
            adapter: Some(adapter),
            persistence: Mutex::new(Some(handle)),
        }
    }

    pub fn state(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn channel_filters(&self) -> ChannelFilters {
        self.state.borrow().channel_filters().clone()
    }

    pub fn gift_filters(&self) -> GiftFilters {
        self.state.borrow().gift_filters().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    pub fn update_channel_filters(&self, patch: ChannelFiltersPatch) {
        self.dispatch(Msg::UpdateChannelFilters(patch));
    }

    pub fn update_gift_filters(&self, patch: GiftFiltersPatch) {
        self.dispatch(Msg::UpdateGiftFilters(patch));
    }

    pub fn reset_channel_filters(&self) {
        self.dispatch(Msg::ResetChannelFilters);
    }

    pub fn reset_gift_filters(&self) {
        self.dispatch(Msg::ResetGiftFilters);
    }

    pub fn hydrate_from_storage(&self, snapshot: PersistedFilterPatch) {
        self.dispatch(Msg::HydrateFromStorage(snapshot));
    }

    /// Loads the persisted snapshot and merges it in. Missing or unreadable
    /// storage still marks the store hydrated.
    pub async fn hydrate(&self) {
        let snapshot = match &self.adapter {
            Some(adapter) => adapter.load().await.unwrap_or_default(),
            None => PersistedFilterPatch::default(),
        };
        self.hydrate_from_storage(snapshot);
    }

    /// Applies one reducer action, notifies subscribers and runs its effects.
    pub fn dispatch(&self, msg: Msg) {
        listing_debug!("Filter store dispatch: {:?}", msg);
        let mut effects = Vec::new();
        self.state.send_if_modified(|state| {
            let (next, produced) = update(state.clone(), msg);
            let modified = *state != next;
            *state = next;
            effects = produced;
            modified
        });
        self.run_effects(effects);
    }

    /// Waits until queued snapshots reach the store.
    pub async fn flush(&self) {
        let handle = self.lock_persistence().clone();
        if let Some(handle) = handle {
            handle.flush().await;
        }
    }

    /// Teardown: later mutations stay in memory only.
    pub fn detach_persistence(&self) {
        if self.lock_persistence().take().is_some() {
            listing_info!("Filter persistence detached");
        }
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistFilters(snapshot) => {
                    if let Some(handle) = self.lock_persistence().as_ref() {
                        handle.save(snapshot);
                    }
                }
            }
        }
    }

    fn lock_persistence(&self) -> std::sync::MutexGuard<'_, Option<PersistenceHandle>> {
        self.persistence.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
