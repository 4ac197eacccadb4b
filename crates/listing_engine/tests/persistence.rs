mod support;

use std::sync::Arc;

use listing_core::{
    ChannelFilters, ChannelFiltersPatch, GiftFiltersPatch, PersistedFilterState, Selector,
    Sorting,
};
use listing_engine::{
    FileKeyValueStore, FilterStore, KeyValueStore, MemoryKeyValueStore, PersistError,
    PersistenceAdapter,
};
use pretty_assertions::assert_eq;
use support::init_logging;

const KEY: &str = "listing.filters";

struct UnavailableStore;

#[async_trait::async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::Unavailable("quota exceeded".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Unavailable("quota exceeded".into()))
    }
}

fn persisted(memory: &MemoryKeyValueStore) -> PersistedFilterState {
    let raw = memory.snapshot(KEY).expect("snapshot written");
    serde_json::from_str(&raw).expect("valid snapshot")
}

fn sorting(sorting: Sorting) -> ChannelFiltersPatch {
    ChannelFiltersPatch {
        sorting: Some(sorting),
        ..ChannelFiltersPatch::default()
    }
}

#[tokio::test]
async fn hydration_merges_stored_fields_over_defaults() {
    init_logging();
    let memory = Arc::new(MemoryKeyValueStore::with_entry(
        KEY,
        r#"{"channels":{"sorting":"price_low_to_high"}}"#,
    ));
    let store = FilterStore::with_persistence(PersistenceAdapter::new(memory, KEY));
    let mut changes = store.subscribe();

    store.hydrate().await;

    let expected = ChannelFilters {
        sorting: Sorting::PriceLowToHigh,
        ..ChannelFilters::default()
    };
    assert_eq!(store.channel_filters(), expected);
    assert!(store.channel_filters().show_upgraded);
    assert!(store.state().is_hydrated());
    assert!(changes.has_changed().unwrap());
}

#[tokio::test]
async fn every_change_writes_the_full_snapshot() {
    let memory = Arc::new(MemoryKeyValueStore::new());
    let store = FilterStore::with_persistence(PersistenceAdapter::new(memory.clone(), KEY));
    store.hydrate().await;

    store.update_channel_filters(sorting(Sorting::PriceHighToLow));
    store.update_gift_filters(GiftFiltersPatch {
        collection: Some(Selector::new("Snoop Dogg")),
        ..GiftFiltersPatch::default()
    });
    store.flush().await;

    let snapshot = persisted(&memory);
    assert_eq!(snapshot, store.state().snapshot());
    assert_eq!(snapshot.channels.sorting, Sorting::PriceHighToLow);
    assert_eq!(snapshot.gifts.collection, Selector::new("Snoop Dogg"));
}

#[tokio::test]
async fn rapid_changes_leave_the_latest_snapshot() {
    let memory = Arc::new(MemoryKeyValueStore::new());
    let store = FilterStore::with_persistence(PersistenceAdapter::new(memory.clone(), KEY));
    store.hydrate().await;

    for sort in Sorting::ALL.iter().cycle().take(9) {
        store.update_channel_filters(sorting(*sort));
    }
    store.flush().await;

    assert_eq!(persisted(&memory).channels.sorting, Sorting::DateNewToOld);
    assert_eq!(store.channel_filters().sorting, Sorting::DateNewToOld);
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_defaults() {
    init_logging();
    let memory = Arc::new(MemoryKeyValueStore::with_entry(KEY, "{not json"));
    let adapter = PersistenceAdapter::new(memory, KEY);
    assert_eq!(adapter.load().await, None);

    let store = FilterStore::with_persistence(adapter);
    store.hydrate().await;
    assert!(store.state().is_hydrated());
    assert_eq!(store.channel_filters(), ChannelFilters::default());
}

#[tokio::test]
async fn unavailable_storage_keeps_filters_usable_in_memory() {
    init_logging();
    let store = FilterStore::with_persistence(PersistenceAdapter::new(
        Arc::new(UnavailableStore),
        KEY,
    ));
    store.hydrate().await;
    assert!(store.state().is_hydrated());

    store.update_channel_filters(sorting(Sorting::PriceLowToHigh));
    store.flush().await;
    assert_eq!(store.channel_filters().sorting, Sorting::PriceLowToHigh);
}

#[tokio::test]
async fn detached_store_stops_writing() {
    let memory = Arc::new(MemoryKeyValueStore::new());
    let store = FilterStore::with_persistence(PersistenceAdapter::new(memory.clone(), KEY));
    store.hydrate().await;
    store.update_channel_filters(sorting(Sorting::PriceLowToHigh));
    store.flush().await;

    store.detach_persistence();
    store.update_channel_filters(sorting(Sorting::PriceHighToLow));
    store.flush().await;

    assert_eq!(persisted(&memory).channels.sorting, Sorting::PriceLowToHigh);
    assert_eq!(store.channel_filters().sorting, Sorting::PriceHighToLow);
}

#[tokio::test]
async fn file_store_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state_dir = dir.path().join("state");

    let store = FilterStore::with_persistence(PersistenceAdapter::new(
        Arc::new(FileKeyValueStore::new(&state_dir)),
        KEY,
    ));
    store.hydrate().await;
    store.update_channel_filters(ChannelFiltersPatch {
        max_price: Some(Some(12.5)),
        ..ChannelFiltersPatch::default()
    });
    store.flush().await;

    let files = FileKeyValueStore::new(&state_dir);
    assert!(files.path_for(KEY).exists());

    let restarted =
        FilterStore::with_persistence(PersistenceAdapter::new(Arc::new(files), KEY));
    restarted.hydrate().await;
    assert_eq!(restarted.channel_filters().max_price, Some(12.5));
}

#[tokio::test]
async fn file_store_reports_missing_key_as_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let files = FileKeyValueStore::new(dir.path());
    assert_eq!(files.get("never/written").await.unwrap(), None);
    assert!(files
        .path_for("never/written")
        .ends_with("never_written.json"));
}

#[test]
fn subscribers_see_real_changes_only() {
    let store = FilterStore::in_memory();
    store.update_channel_filters(sorting(Sorting::PriceLowToHigh));
    let mut changes = store.subscribe();
    changes.mark_unchanged();

    store.reset_channel_filters();
    assert!(changes.has_changed().unwrap());
    changes.mark_unchanged();

    store.reset_channel_filters();
    assert!(!changes.has_changed().unwrap());
}
