use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use listing_engine::{FetchSettings, ListingConfig};
use serde::Deserialize;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "listing.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Domain {
    #[default]
    Channels,
    Gifts,
}

/// Driver configuration, read from a RON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing endpoint; pages are requested with `limit` and `cursor`.
    pub endpoint: String,
    pub domain: Domain,
    /// Directory holding the persisted filter snapshot.
    pub state_dir: PathBuf,
    pub storage_key: String,
    pub page_size: u32,
    /// Stop after this many pages even if more are available.
    pub max_pages: usize,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let listing = ListingConfig::default();
        Self {
            endpoint: "http://127.0.0.1:8080/api/channels".to_string(),
            domain: Domain::default(),
            state_dir: PathBuf::from(".listing_state"),
            storage_key: listing.storage_key,
            page_size: listing.page_size,
            max_pages: 5,
            connect_timeout_ms: millis(listing.fetch.connect_timeout),
            request_timeout_ms: millis(listing.fetch.request_timeout),
            max_bytes: listing.fetch.max_bytes,
            log_destination: LogDestination::default(),
            log_file: PathBuf::from("./listing.log"),
        }
    }
}

impl AppConfig {
    /// `None` when the file is missing; an unreadable or malformed file is an error.
    ///
    /// Runs before the logger exists, so the caller reports the outcome.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn listing(&self) -> ListingConfig {
        ListingConfig {
            page_size: self.page_size.max(1),
            storage_key: self.storage_key.clone(),
            fetch: FetchSettings {
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                max_bytes: self.max_bytes,
            },
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
