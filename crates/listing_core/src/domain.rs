use std::fmt::Debug;

use crate::codec::{
    decode_channel_filters, decode_gift_filters, encode_channel_filters, encode_gift_filters,
    ParamBag, CHANNEL_PARAMS, GIFT_PARAMS,
};
use crate::{
    ApiQuery, ChannelApiFilters, ChannelFilters, ChannelFiltersPatch, FilterState, GiftApiFilters,
    GiftFilters, GiftFiltersPatch, Msg,
};

/// Binds one listing page's filter types to the shared store, the codec and the projection.
pub trait FilterDomain: Send + Sync + 'static {
    type Filters: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Patch: Clone + PartialEq + Debug + Default + Send + Sync + 'static;
    type Api: ApiQuery + Clone + PartialEq + Debug + Send + Sync + 'static;

    const NAME: &'static str;

    /// Address-bar keys this domain owns.
    const PARAMS: &'static [&'static str];

    fn select(state: &FilterState) -> &Self::Filters;
    fn update_msg(patch: Self::Patch) -> Msg;
    fn reset_msg() -> Msg;
    fn merge(filters: &Self::Filters, patch: &Self::Patch) -> Self::Filters;
    fn encode(filters: &Self::Filters) -> ParamBag;
    fn decode(params: &ParamBag) -> Self::Patch;
    fn project(filters: &Self::Filters) -> Self::Api;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelDomain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GiftDomain;

impl FilterDomain for ChannelDomain {
    type Filters = ChannelFilters;
    type Patch = ChannelFiltersPatch;
    type Api = ChannelApiFilters;

    const NAME: &'static str = "channels";
    const PARAMS: &'static [&'static str] = CHANNEL_PARAMS;

    fn select(state: &FilterState) -> &ChannelFilters {
        state.channel_filters()
    }

    fn update_msg(patch: ChannelFiltersPatch) -> Msg {
        Msg::UpdateChannelFilters(patch)
    }

    fn reset_msg() -> Msg {
        Msg::ResetChannelFilters
    }

    fn merge(filters: &ChannelFilters, patch: &ChannelFiltersPatch) -> ChannelFilters {
        filters.merged(patch)
    }

    fn encode(filters: &ChannelFilters) -> ParamBag {
        encode_channel_filters(filters)
    }

    fn decode(params: &ParamBag) -> ChannelFiltersPatch {
        decode_channel_filters(params)
    }

    fn project(filters: &ChannelFilters) -> ChannelApiFilters {
        ChannelApiFilters::from(filters)
    }
}

impl FilterDomain for GiftDomain {
    type Filters = GiftFilters;
    type Patch = GiftFiltersPatch;
    type Api = GiftApiFilters;

    const NAME: &'static str = "gifts";
    const PARAMS: &'static [&'static str] = GIFT_PARAMS;

    fn select(state: &FilterState) -> &GiftFilters {
        state.gift_filters()
    }

    fn update_msg(patch: GiftFiltersPatch) -> Msg {
        Msg::UpdateGiftFilters(patch)
    }

    fn reset_msg() -> Msg {
        Msg::ResetGiftFilters
    }

    fn merge(filters: &GiftFilters, patch: &GiftFiltersPatch) -> GiftFilters {
        filters.merged(patch)
    }

    fn encode(filters: &GiftFilters) -> ParamBag {
        encode_gift_filters(filters)
    }

    fn decode(params: &ParamBag) -> GiftFiltersPatch {
        decode_gift_filters(params)
    }

    fn project(filters: &GiftFilters) -> GiftApiFilters {
        GiftApiFilters::from(filters)
    }
}
