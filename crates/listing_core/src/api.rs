use serde::Serialize;

use crate::{ChannelFilters, ChannelType, GiftFilters, Sorting};

/// Renders server-shaped filters as request query parameters.
pub trait ApiQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Server-shaped projection of [`ChannelFilters`]. `All` and unset bounds are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelApiFilters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gift_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<ChannelType>,
    pub sorting: Sorting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,
    pub only_exact_gift: bool,
    pub show_upgraded: bool,
}

impl From<&ChannelFilters> for ChannelApiFilters {
    fn from(filters: &ChannelFilters) -> Self {
        Self {
            gift_ids: filters.gift.iter().cloned().collect(),
            channel_type: (filters.channel_type != ChannelType::All)
                .then_some(filters.channel_type),
            sorting: filters.sorting,
            min_price: filters.min_price,
            max_price: filters.max_price,
            min_quantity: filters.min_quantity,
            max_quantity: filters.max_quantity,
            only_exact_gift: filters.only_exact_gift,
            show_upgraded: filters.show_upgraded,
        }
    }
}

impl ApiQuery for ChannelApiFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.gift_ids.is_empty() {
            pairs.push(("giftIds", self.gift_ids.join(",")));
        }
        if let Some(channel_type) = self.channel_type {
            pairs.push(("channelType", channel_type.as_str().to_string()));
        }
        pairs.push(("sorting", self.sorting.as_str().to_string()));
        let bounds = [
            ("minPrice", self.min_price.map(|v| v.to_string())),
            ("maxPrice", self.max_price.map(|v| v.to_string())),
            ("minQuantity", self.min_quantity.map(|v| v.to_string())),
            ("maxQuantity", self.max_quantity.map(|v| v.to_string())),
        ];
        pairs.extend(
            bounds
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        );
        pairs.push(("onlyExactGift", self.only_exact_gift.to_string()));
        pairs.push(("showUpgraded", self.show_upgraded.to_string()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftApiFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub sorting: Sorting,
}

impl From<&GiftFilters> for GiftApiFilters {
    fn from(filters: &GiftFilters) -> Self {
        let selected = |selector: &crate::Selector| {
            (!selector.is_all()).then(|| selector.as_str().to_string())
        };
        Self {
            collection: selected(&filters.collection),
            model: selected(&filters.model),
            background: selected(&filters.background),
            sorting: filters.sorting,
        }
    }
}

impl ApiQuery for GiftApiFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = [
            ("collection", &self.collection),
            ("model", &self.model),
            ("background", &self.background),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
        .collect();
        pairs.push(("sorting", self.sorting.as_str().to_string()));
        pairs
    }
}
