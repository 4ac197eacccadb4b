use crate::{ChannelFiltersPatch, GiftFiltersPatch, PersistedFilterPatch};

/// Reducer actions. The only way filter state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    UpdateChannelFilters(ChannelFiltersPatch),
    UpdateGiftFilters(GiftFiltersPatch),
    ResetChannelFilters,
    ResetGiftFilters,
    /// One-shot merge of the persisted snapshot; ignored once hydrated.
    HydrateFromStorage(PersistedFilterPatch),
}
