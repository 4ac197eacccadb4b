use std::sync::Once;

use listing_core::{
    update, ChannelFilters, ChannelFiltersPatch, Effect, FilterState, GiftFilters,
    GiftFiltersPatch, Msg, PersistedFilterPatch, Selector, Sorting,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

fn persisted(json: &str) -> PersistedFilterPatch {
    serde_json::from_str(json).expect("persisted snapshot")
}

fn hydrated() -> FilterState {
    let (state, _) = update(
        FilterState::new(),
        Msg::HydrateFromStorage(PersistedFilterPatch::default()),
    );
    state
}

#[test]
fn update_merges_shallowly_and_persists_full_snapshot() {
    init_logging();
    let (state, effects) = update(
        hydrated(),
        Msg::UpdateChannelFilters(ChannelFiltersPatch {
            sorting: Some(Sorting::PriceHighToLow),
            min_quantity: Some(Some(2)),
            ..ChannelFiltersPatch::default()
        }),
    );

    let expected = ChannelFilters {
        sorting: Sorting::PriceHighToLow,
        min_quantity: Some(2),
        ..ChannelFilters::default()
    };
    assert_eq!(state.channel_filters(), &expected);
    assert_eq!(effects, vec![Effect::PersistFilters(state.snapshot())]);
    assert_eq!(state.gift_filters(), &GiftFilters::default());
}

#[test]
fn unchanged_update_does_not_persist() {
    let (_, effects) = update(
        hydrated(),
        Msg::UpdateGiftFilters(GiftFiltersPatch {
            sorting: Some(Sorting::DateNewToOld),
            ..GiftFiltersPatch::default()
        }),
    );
    assert!(effects.is_empty());
}

#[test]
fn reset_restores_one_domain_only() {
    let (state, _) = update(
        hydrated(),
        Msg::UpdateChannelFilters(ChannelFiltersPatch {
            show_upgraded: Some(false),
            ..ChannelFiltersPatch::default()
        }),
    );
    let (state, _) = update(
        state,
        Msg::UpdateGiftFilters(GiftFiltersPatch {
            collection: Some(Selector::new("Plush Pepe")),
            ..GiftFiltersPatch::default()
        }),
    );

    let (state, effects) = update(state, Msg::ResetChannelFilters);
    assert_eq!(state.channel_filters(), &ChannelFilters::default());
    assert_eq!(state.gift_filters().collection, Selector::new("Plush Pepe"));
    assert_eq!(effects.len(), 1);
}

#[test]
fn hydration_merges_persisted_fields_over_defaults() {
    init_logging();
    let (state, _) = update(
        FilterState::new(),
        Msg::HydrateFromStorage(persisted(
            r#"{"channels":{"sorting":"price_low_to_high"}}"#,
        )),
    );

    assert!(state.is_hydrated());
    assert_eq!(state.channel_filters().sorting, Sorting::PriceLowToHigh);
    assert!(state.channel_filters().show_upgraded);
}

#[test]
fn hydration_runs_at_most_once() {
    let (state, _) = update(
        FilterState::new(),
        Msg::HydrateFromStorage(persisted(r#"{"gifts":{"model":"Ruby"}}"#)),
    );
    let (state, effects) = update(
        state,
        Msg::HydrateFromStorage(persisted(r#"{"gifts":{"model":"Onyx"}}"#)),
    );

    assert_eq!(state.gift_filters().model, Selector::new("Ruby"));
    assert!(effects.is_empty());
}

#[test]
fn hydration_does_not_override_fields_set_before_it() {
    let (state, _) = update(
        FilterState::new(),
        Msg::UpdateChannelFilters(ChannelFiltersPatch {
            sorting: Some(Sorting::PriceHighToLow),
            ..ChannelFiltersPatch::default()
        }),
    );
    let (state, _) = update(
        state,
        Msg::HydrateFromStorage(persisted(
            r#"{"channels":{"sorting":"date_new_to_old","showUpgraded":false}}"#,
        )),
    );

    assert_eq!(state.channel_filters().sorting, Sorting::PriceHighToLow);
    assert!(!state.channel_filters().show_upgraded);
}

#[test]
fn malformed_snapshot_degrades_to_defaults() {
    let (state, _) = update(
        FilterState::new(),
        Msg::HydrateFromStorage(persisted(
            r#"{"channels":42,"gifts":{"sorting":"sideways","collection":"Caps"}}"#,
        )),
    );

    assert_eq!(state.channel_filters(), &ChannelFilters::default());
    assert_eq!(state.gift_filters().sorting, Sorting::DateNewToOld);
    assert_eq!(state.gift_filters().collection, Selector::new("Caps"));
}

#[test]
fn edits_before_hydration_are_not_written() {
    let (state, effects) = update(
        FilterState::new(),
        Msg::UpdateChannelFilters(ChannelFiltersPatch {
            sorting: Some(Sorting::PriceHighToLow),
            ..ChannelFiltersPatch::default()
        }),
    );
    assert_eq!(state.channel_filters().sorting, Sorting::PriceHighToLow);
    assert!(effects.is_empty());

    let (_, effects) = update(state, Msg::ResetGiftFilters);
    assert!(effects.is_empty());
}

#[test]
fn hydration_writes_the_merged_result_of_earlier_edits() {
    let (state, _) = update(
        FilterState::new(),
        Msg::UpdateChannelFilters(ChannelFiltersPatch {
            sorting: Some(Sorting::PriceHighToLow),
            ..ChannelFiltersPatch::default()
        }),
    );
    let (state, effects) = update(
        state,
        Msg::HydrateFromStorage(persisted(
            r#"{"channels":{"sorting":"price_low_to_high","minQuantity":3}}"#,
        )),
    );

    let expected = ChannelFilters {
        sorting: Sorting::PriceHighToLow,
        min_quantity: Some(3),
        ..ChannelFilters::default()
    };
    assert_eq!(state.channel_filters(), &expected);
    assert_eq!(effects, vec![Effect::PersistFilters(state.snapshot())]);
}

#[test]
fn hydration_matching_a_default_edit_still_writes() {
    let (state, _) = update(
        FilterState::new(),
        Msg::UpdateGiftFilters(GiftFiltersPatch {
            sorting: Some(Sorting::DateNewToOld),
            ..GiftFiltersPatch::default()
        }),
    );
    let (state, effects) = update(
        state,
        Msg::HydrateFromStorage(persisted(r#"{"gifts":{"sorting":"price_high_to_low"}}"#)),
    );

    assert_eq!(state.gift_filters(), &GiftFilters::default());
    assert_eq!(effects, vec![Effect::PersistFilters(state.snapshot())]);
}
