use listing_logging::{listing_debug, listing_trace};

use crate::{Effect, FilterState, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Once hydrated, every change to the filter values produces exactly one
/// `PersistFilters` effect carrying the full snapshot. Before hydration nothing
/// is written, so the stored snapshot survives until it has been read; the
/// hydration itself then persists the merged result of any earlier edits.
pub fn update(mut state: FilterState, msg: Msg) -> (FilterState, Vec<Effect>) {
    let before = state.snapshot();
    let mut edited_before_hydration = false;

    match msg {
        Msg::UpdateChannelFilters(patch) => state.update_channels(&patch),
        Msg::UpdateGiftFilters(patch) => state.update_gifts(&patch),
        Msg::ResetChannelFilters => state.reset_channels(),
        Msg::ResetGiftFilters => state.reset_gifts(),
        Msg::HydrateFromStorage(persisted) => {
            edited_before_hydration = state.has_pinned_fields();
            if !state.hydrate(persisted) {
                listing_debug!("Ignoring repeated hydration; filters already hydrated");
                return (state, Vec::new());
            }
        }
    }

    if !state.is_hydrated() {
        listing_trace!("Filters not hydrated yet; snapshot write deferred");
        return (state, Vec::new());
    }

    let after = state.snapshot();
    if after == before && !edited_before_hydration {
        listing_trace!("Filter update left state unchanged");
        return (state, Vec::new());
    }
    (state, vec![Effect::PersistFilters(after)])
}
