mod config;
mod logging;
mod viewport;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use listing_core::{ChannelDomain, FilterDomain, GiftDomain};
use listing_engine::{
    ensure_state_dir, FileKeyValueStore, FilterStore, ListingSession, MemoryNavigation,
    PersistenceAdapter, ReqwestPagedFetch,
};
use listing_logging::{listing_debug, listing_info, listing_warn};
use serde_json::Value;

use crate::config::{AppConfig, Domain, DEFAULT_CONFIG_FILE};
use crate::viewport::TerminalViewport;

/// Fetches a filtered listing page by page and prints one JSON item per line.
#[derive(Debug, Parser)]
#[command(name = "listing", version)]
struct Cli {
    /// RON configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address-bar query string applied as a deep link, e.g. `sorting=price_low_to_high`.
    #[arg(long, value_name = "QUERY", default_value = "")]
    query: String,

    /// Override the configured page limit.
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = AppConfig::load(&cli.config)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }
    logging::initialize(
        config.log_destination,
        listing_logging::default_level(),
        &config.log_file,
    );
    if found {
        listing_info!("Loaded config from {:?}", cli.config);
    } else {
        listing_debug!("No config at {:?}; using defaults", cli.config);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(async {
        match config.domain {
            Domain::Channels => run::<ChannelDomain>(&config, &cli.query).await,
            Domain::Gifts => run::<GiftDomain>(&config, &cli.query).await,
        }
    })
}

async fn run<D: FilterDomain>(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let listing = config.listing();
    ensure_state_dir(&config.state_dir)
        .with_context(|| format!("preparing state dir {}", config.state_dir.display()))?;
    let store = Arc::new(FilterStore::with_persistence(PersistenceAdapter::new(
        Arc::new(FileKeyValueStore::new(&config.state_dir)),
        listing.storage_key.clone(),
    )));
    store.hydrate().await;

    let navigation = Arc::new(MemoryNavigation::from_query(query));
    let fetcher = ReqwestPagedFetch::new(&config.endpoint, listing.fetch.clone())
        .with_context(|| format!("listing endpoint {}", config.endpoint))?;
    let session = ListingSession::<D, Value>::mount(
        store.clone(),
        navigation.clone(),
        Arc::new(fetcher),
        Arc::new(TerminalViewport::new()),
        listing.page_size,
    );
    listing_info!("Listing {} with {:?}", D::NAME, session.current_filters());

    let result = drain(&session, config.max_pages).await;

    drop(session);
    store.flush().await;
    store.detach_persistence();
    listing_info!("Address bar: ?{}", navigation.current_query());
    result
}

/// Renders pages as they arrive; rendering re-arms the trigger, which requests
/// the next page while one is available.
async fn drain<D: FilterDomain>(
    session: &ListingSession<D, Value>,
    max_pages: usize,
) -> anyhow::Result<()> {
    let mut printed = 0;
    loop {
        if let Some(Err(err)) = session.settled().await {
            listing_warn!("Stopping after {} items: {}", printed, err);
            return Err(err).context("fetching listing page");
        }

        let coordinator = session.coordinator();
        let view = if coordinator.page_count() >= max_pages {
            coordinator.view()
        } else {
            session.view()
        };
        for item in view.items.iter().skip(printed) {
            println!("{item}");
        }
        printed = view.items.len();

        if !view.has_next_page {
            listing_info!("End of listing: {} items", printed);
            return Ok(());
        }
        if coordinator.page_count() >= max_pages {
            listing_info!("Page limit reached: {} items", printed);
            return Ok(());
        }
        if !view.is_loading && !coordinator.is_fetching_next_page() {
            // Empty page with a cursor: the sentinel did not move.
            listing_info!("No further page requested: {} items", printed);
            return Ok(());
        }
    }
}
