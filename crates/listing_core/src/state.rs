use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::{ChannelFilters, ChannelFiltersPatch, GiftFilters, GiftFiltersPatch};

/// Full snapshot written to the persistent store on every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedFilterState {
    pub channels: ChannelFilters,
    pub gifts: GiftFilters,
}

/// Read shape of a persisted snapshot: every field optional, merged over defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PersistedFilterPatch {
    #[serde(deserialize_with = "lenient")]
    pub channels: Option<ChannelFiltersPatch>,
    #[serde(deserialize_with = "lenient")]
    pub gifts: Option<GiftFiltersPatch>,
}

/// Canonical filter state for every listing domain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    channels: ChannelFilters,
    gifts: GiftFilters,
    hydrated: bool,
    // Fields explicitly set before hydration; hydration must not override them.
    pinned_channels: ChannelFiltersPatch,
    pinned_gifts: GiftFiltersPatch,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_filters(&self) -> &ChannelFilters {
        &self.channels
    }

    pub fn gift_filters(&self) -> &GiftFilters {
        &self.gifts
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn snapshot(&self) -> PersistedFilterState {
        PersistedFilterState {
            channels: self.channels.clone(),
            gifts: self.gifts.clone(),
        }
    }

    pub(crate) fn update_channels(&mut self, patch: &ChannelFiltersPatch) {
        self.channels.apply(patch);
        if !self.hydrated {
            self.pinned_channels.pin(patch);
        }
    }

    pub(crate) fn update_gifts(&mut self, patch: &GiftFiltersPatch) {
        self.gifts.apply(patch);
        if !self.hydrated {
            self.pinned_gifts.pin(patch);
        }
    }

    pub(crate) fn reset_channels(&mut self) {
        self.channels = ChannelFilters::default();
        if !self.hydrated {
            self.pinned_channels = ChannelFiltersPatch::from(&self.channels);
        }
    }

    pub(crate) fn reset_gifts(&mut self) {
        self.gifts = GiftFilters::default();
        if !self.hydrated {
            self.pinned_gifts = GiftFiltersPatch::from(&self.gifts);
        }
    }

    pub(crate) fn has_pinned_fields(&self) -> bool {
        !self.pinned_channels.is_empty() || !self.pinned_gifts.is_empty()
    }

    /// Returns false when hydration already ran.
    pub(crate) fn hydrate(&mut self, persisted: PersistedFilterPatch) -> bool {
        if self.hydrated {
            return false;
        }
        self.hydrated = true;

        if let Some(mut channels) = persisted.channels {
            channels.mask(&self.pinned_channels);
            self.channels.apply(&channels);
        }
        if let Some(mut gifts) = persisted.gifts {
            gifts.mask(&self.pinned_gifts);
            self.gifts.apply(&gifts);
        }

        self.pinned_channels = ChannelFiltersPatch::default();
        self.pinned_gifts = GiftFiltersPatch::default();
        true
    }
}
