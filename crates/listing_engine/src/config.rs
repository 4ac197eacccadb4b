use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    pub page_size: u32,
    /// Namespace key for the persisted filter snapshot.
    pub storage_key: String,
    pub fetch: FetchSettings,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            storage_key: "listing.filters".to_string(),
            fetch: FetchSettings::default(),
        }
    }
}
