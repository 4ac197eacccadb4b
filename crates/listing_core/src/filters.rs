use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Listing order shared by both filter domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sorting {
    #[default]
    DateNewToOld,
    DateOldToNew,
    PriceLowToHigh,
    PriceHighToLow,
}

impl Sorting {
    pub const ALL: [Sorting; 4] = [
        Sorting::DateNewToOld,
        Sorting::DateOldToNew,
        Sorting::PriceLowToHigh,
        Sorting::PriceHighToLow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Sorting::DateNewToOld => "date_new_to_old",
            Sorting::DateOldToNew => "date_old_to_new",
            Sorting::PriceLowToHigh => "price_low_to_high",
            Sorting::PriceHighToLow => "price_high_to_low",
        }
    }

    pub fn from_param(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sorting| sorting.as_str() == raw)
    }
}

impl fmt::Display for Sorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    #[default]
    All,
    Public,
    Private,
}

impl ChannelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelType::All => "all",
            ChannelType::Public => "public",
            ChannelType::Private => "private",
        }
    }
}

/// A collection/model/background selector. `"All"` means "no restriction".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Selector(String);

impl Selector {
    pub const ALL: &'static str = "All";

    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    /// Blank input collapses to the `All` sentinel.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == Self::ALL {
            Self::all()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.0
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelFilters {
    pub gift: BTreeSet<String>,
    pub channel_type: ChannelType,
    pub sorting: Sorting,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<u32>,
    pub max_quantity: Option<u32>,
    pub only_exact_gift: bool,
    pub show_upgraded: bool,
}

impl Default for ChannelFilters {
    fn default() -> Self {
        Self {
            gift: BTreeSet::new(),
            channel_type: ChannelType::All,
            sorting: Sorting::DateNewToOld,
            min_price: None,
            max_price: None,
            min_quantity: None,
            max_quantity: None,
            only_exact_gift: false,
            show_upgraded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftFilters {
    pub collection: Selector,
    pub model: Selector,
    pub background: Selector,
    pub sorting: Sorting,
}

/// Partial update for [`ChannelFilters`]. `None` leaves a field untouched.
///
/// Doubles as the lenient read shape for persisted snapshots: each field is
/// decoded on its own and a malformed value reads as absent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelFiltersPatch {
    #[serde(deserialize_with = "lenient")]
    pub gift: Option<BTreeSet<String>>,
    #[serde(deserialize_with = "lenient")]
    pub channel_type: Option<ChannelType>,
    #[serde(deserialize_with = "lenient")]
    pub sorting: Option<Sorting>,
    #[serde(deserialize_with = "lenient")]
    pub min_price: Option<Option<f64>>,
    #[serde(deserialize_with = "lenient")]
    pub max_price: Option<Option<f64>>,
    #[serde(deserialize_with = "lenient")]
    pub min_quantity: Option<Option<u32>>,
    #[serde(deserialize_with = "lenient")]
    pub max_quantity: Option<Option<u32>>,
    #[serde(deserialize_with = "lenient")]
    pub only_exact_gift: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub show_upgraded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GiftFiltersPatch {
    #[serde(deserialize_with = "lenient")]
    pub collection: Option<Selector>,
    #[serde(deserialize_with = "lenient")]
    pub model: Option<Selector>,
    #[serde(deserialize_with = "lenient")]
    pub background: Option<Selector>,
    #[serde(deserialize_with = "lenient")]
    pub sorting: Option<Sorting>,
}

macro_rules! patch_ops {
    ($filters:ty, $patch:ty, [$($field:ident),+ $(,)?]) => {
        impl $filters {
            /// Shallow merge: every present field replaces the current value wholesale.
            pub fn apply(&mut self, patch: &$patch) {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = value.clone();
                    }
                )+
            }

            pub fn merged(&self, patch: &$patch) -> Self {
                let mut next = self.clone();
                next.apply(patch);
                next
            }
        }

        impl $patch {
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }

            /// Drops every field that `pinned` sets.
            pub fn mask(&mut self, pinned: &$patch) {
                $(
                    if pinned.$field.is_some() {
                        self.$field = None;
                    }
                )+
            }

            /// Marks every field set in `other` as set here too.
            pub fn pin(&mut self, other: &$patch) {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field.clone();
                    }
                )+
            }
        }

        impl From<&$filters> for $patch {
            fn from(filters: &$filters) -> Self {
                Self {
                    $($field: Some(filters.$field.clone()),)+
                }
            }
        }
    };
}

patch_ops!(
    ChannelFilters,
    ChannelFiltersPatch,
    [
        gift,
        channel_type,
        sorting,
        min_price,
        max_price,
        min_quantity,
        max_quantity,
        only_exact_gift,
        show_upgraded,
    ]
);

patch_ops!(
    GiftFilters,
    GiftFiltersPatch,
    [collection, model, background, sorting]
);

/// Decodes a field independently of its siblings; malformed values read as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            listing_logging::listing_debug!("Ignoring malformed persisted field: {}", err);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_set_fields_wholesale() {
        let mut filters = ChannelFilters {
            gift: ["a".to_string(), "b".to_string()].into(),
            ..ChannelFilters::default()
        };
        filters.apply(&ChannelFiltersPatch {
            gift: Some(["c".to_string()].into()),
            ..ChannelFiltersPatch::default()
        });
        assert_eq!(filters.gift, BTreeSet::from(["c".to_string()]));
        assert!(filters.show_upgraded);
    }

    #[test]
    fn explicit_none_clears_a_bound() {
        let mut filters = ChannelFilters {
            min_price: Some(3.5),
            ..ChannelFilters::default()
        };
        filters.apply(&ChannelFiltersPatch {
            min_price: Some(None),
            ..ChannelFiltersPatch::default()
        });
        assert_eq!(filters.min_price, None);
    }

    #[test]
    fn mask_drops_pinned_fields() {
        let mut persisted = GiftFiltersPatch {
            sorting: Some(Sorting::PriceLowToHigh),
            model: Some(Selector::new("Ruby")),
            ..GiftFiltersPatch::default()
        };
        let pinned = GiftFiltersPatch {
            sorting: Some(Sorting::PriceHighToLow),
            ..GiftFiltersPatch::default()
        };
        persisted.mask(&pinned);
        assert_eq!(persisted.sorting, None);
        assert_eq!(persisted.model, Some(Selector::new("Ruby")));
    }

    #[test]
    fn lenient_patch_keeps_valid_siblings() {
        let patch: ChannelFiltersPatch = serde_json::from_str(
            r#"{"sorting":"price_low_to_high","minQuantity":"many","unknown":1}"#,
        )
        .unwrap();
        assert_eq!(patch.sorting, Some(Sorting::PriceLowToHigh));
        assert_eq!(patch.min_quantity, None);
    }

    #[test]
    fn blank_selector_is_all() {
        assert!(Selector::new("  ").is_all());
        assert_eq!(Selector::default(), Selector::all());
    }
}
