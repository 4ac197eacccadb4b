//! Address-bar codec for the mirrored subset of filter fields.
//!
//! Encoding omits fields at their default so the same state always yields the
//! same parameter string. Decoding never fails: malformed values are logged and
//! replaced by the field default.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use listing_logging::listing_warn;
use url::form_urlencoded;

use crate::{
    ChannelFilters, ChannelFiltersPatch, DecodeIssue, GiftFilters, GiftFiltersPatch, Selector,
    Sorting,
};

pub const GIFT_PARAM: &str = "gift";
pub const SORTING_PARAM: &str = "sorting";
pub const MIN_PRICE_PARAM: &str = "minPrice";
pub const MAX_PRICE_PARAM: &str = "maxPrice";
pub const MIN_QUANTITY_PARAM: &str = "minQuantity";
pub const MAX_QUANTITY_PARAM: &str = "maxQuantity";
pub const COLLECTION_PARAM: &str = "collection";
pub const MODEL_PARAM: &str = "model";
pub const BACKGROUND_PARAM: &str = "background";

pub const CHANNEL_PARAMS: &[&str] = &[
    GIFT_PARAM,
    SORTING_PARAM,
    MIN_PRICE_PARAM,
    MAX_PRICE_PARAM,
    MIN_QUANTITY_PARAM,
    MAX_QUANTITY_PARAM,
];

pub const GIFT_PARAMS: &[&str] = &[COLLECTION_PARAM, MODEL_PARAM, BACKGROUND_PARAM, SORTING_PARAM];

/// Address-bar parameters. Ordered by key so serialization is stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamBag(BTreeMap<String, String>);

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every key in `owned` with the values from `encoded`, keeping foreign keys.
    pub fn replace_owned(&mut self, owned: &[&str], encoded: ParamBag) {
        for key in owned {
            self.0.remove(*key);
        }
        self.0.extend(encoded.0);
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    /// Parses `a=1&b=2` (a leading `?` is ignored). Later duplicates win.
    pub fn parse_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

pub fn encode_channel_filters(filters: &ChannelFilters) -> ParamBag {
    let mut params = ParamBag::new();
    if !filters.gift.is_empty() {
        let ids: Vec<String> = filters
            .gift
            .iter()
            .map(|id| form_urlencoded::byte_serialize(id.as_bytes()).collect())
            .collect();
        params.insert(GIFT_PARAM, ids.join(","));
    }
    if filters.sorting != Sorting::default() {
        params.insert(SORTING_PARAM, filters.sorting.as_str());
    }
    if let Some(value) = filters.min_price {
        params.insert(MIN_PRICE_PARAM, value.to_string());
    }
    if let Some(value) = filters.max_price {
        params.insert(MAX_PRICE_PARAM, value.to_string());
    }
    if let Some(value) = filters.min_quantity {
        params.insert(MIN_QUANTITY_PARAM, value.to_string());
    }
    if let Some(value) = filters.max_quantity {
        params.insert(MAX_QUANTITY_PARAM, value.to_string());
    }
    params
}

/// Only parameters present in `params` appear in the patch.
pub fn decode_channel_filters(params: &ParamBag) -> ChannelFiltersPatch {
    ChannelFiltersPatch {
        gift: params.get(GIFT_PARAM).map(decode_gift_ids),
        sorting: params
            .get(SORTING_PARAM)
            .map(|raw| recover(decode_sorting(raw))),
        min_price: params
            .get(MIN_PRICE_PARAM)
            .map(|raw| recover(decode_price(MIN_PRICE_PARAM, raw))),
        max_price: params
            .get(MAX_PRICE_PARAM)
            .map(|raw| recover(decode_price(MAX_PRICE_PARAM, raw))),
        min_quantity: params
            .get(MIN_QUANTITY_PARAM)
            .map(|raw| recover(decode_number(MIN_QUANTITY_PARAM, raw))),
        max_quantity: params
            .get(MAX_QUANTITY_PARAM)
            .map(|raw| recover(decode_number(MAX_QUANTITY_PARAM, raw))),
        ..ChannelFiltersPatch::default()
    }
}

pub fn encode_gift_filters(filters: &GiftFilters) -> ParamBag {
    let mut params = ParamBag::new();
    for (key, selector) in [
        (COLLECTION_PARAM, &filters.collection),
        (MODEL_PARAM, &filters.model),
        (BACKGROUND_PARAM, &filters.background),
    ] {
        if !selector.is_all() {
            params.insert(key, selector.as_str());
        }
    }
    if filters.sorting != Sorting::default() {
        params.insert(SORTING_PARAM, filters.sorting.as_str());
    }
    params
}

pub fn decode_gift_filters(params: &ParamBag) -> GiftFiltersPatch {
    GiftFiltersPatch {
        collection: params.get(COLLECTION_PARAM).map(Selector::new),
        model: params.get(MODEL_PARAM).map(Selector::new),
        background: params.get(BACKGROUND_PARAM).map(Selector::new),
        sorting: params
            .get(SORTING_PARAM)
            .map(|raw| recover(decode_sorting(raw))),
    }
}

// Ids are percent-escaped one by one on encode, so each part decodes verbatim.
fn decode_gift_ids(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|part| {
            form_urlencoded::parse(part.as_bytes())
                .next()
                .map(|(id, _)| id.into_owned())
                .unwrap_or_default()
        })
        .collect()
}

fn decode_sorting(raw: &str) -> Result<Sorting, DecodeIssue> {
    Sorting::from_param(raw.trim()).ok_or_else(|| DecodeIssue::UnknownValue {
        key: SORTING_PARAM,
        value: raw.to_string(),
    })
}

fn decode_price(key: &'static str, raw: &str) -> Result<Option<f64>, DecodeIssue> {
    let value: f64 = decode_number(key, raw)?.unwrap_or_default();
    if !value.is_finite() || value < 0.0 {
        return Err(DecodeIssue::OutOfRange {
            key,
            value: raw.to_string(),
        });
    }
    Ok(Some(value))
}

fn decode_number<N: FromStr>(key: &'static str, raw: &str) -> Result<Option<N>, DecodeIssue> {
    raw.trim()
        .parse::<N>()
        .map(Some)
        .map_err(|_| DecodeIssue::NotANumber {
            key,
            value: raw.to_string(),
        })
}

fn recover<T: Default>(result: Result<T, DecodeIssue>) -> T {
    result.unwrap_or_else(|issue| {
        listing_warn!("Malformed address-bar value, using default: {}", issue);
        T::default()
    })
}
