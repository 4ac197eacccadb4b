//! Listing core: pure filter state machine, address-bar codec and pagination bookkeeping.
mod api;
pub mod codec;
mod domain;
mod effect;
mod error;
mod filters;
mod msg;
mod pagination;
mod state;
mod trigger;
mod update;
mod view_model;

pub use api::{ApiQuery, ChannelApiFilters, GiftApiFilters};
pub use codec::ParamBag;
pub use domain::{ChannelDomain, FilterDomain, GiftDomain};
pub use effect::Effect;
pub use error::{DecodeIssue, FailureKind, FetchError};
pub use filters::{
    ChannelFilters, ChannelFiltersPatch, ChannelType, GiftFilters, GiftFiltersPatch, Selector,
    Sorting,
};
pub use msg::Msg;
pub use pagination::{Completion, Cursor, FetchPhase, Page, PageKey, PageRequest, Pagination};
pub use state::{FilterState, PersistedFilterPatch, PersistedFilterState};
pub use trigger::{FetchGate, SentinelRef, TriggerState};
pub use update::update;
pub use view_model::ListingView;

pub(crate) use filters::lenient;
