use crate::{FetchError, Pagination, SentinelRef};

/// Snapshot of one listing handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingView<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    pub error: Option<FetchError>,
    pub sentinel: Option<SentinelRef>,
}

impl<F: Clone + PartialEq, T: Clone> From<&Pagination<F, T>> for ListingView<T> {
    fn from(pagination: &Pagination<F, T>) -> Self {
        Self {
            items: pagination.items().cloned().collect(),
            has_next_page: pagination.has_next_page(),
            is_loading: pagination.is_loading(),
            is_fetching_next_page: pagination.is_fetching_next_page(),
            error: pagination.error().cloned(),
            sentinel: pagination.sentinel(),
        }
    }
}
