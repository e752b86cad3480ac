//! Crawler module for catalog paging and book harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with optional retry
//! - Catalog link extraction and sequential catalog paging
//! - Book page extraction
//! - The parallel worker pool for book pages

mod book;
mod catalog;
mod coordinator;
mod fetcher;
mod links;

pub use book::extract_book;
pub use catalog::{catalog_page_url, CatalogCrawler};
pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, FetchError, HttpFetcher, PageSource,
    RetryPolicy,
};
pub use links::extract_links;

use crate::config::Config;
use crate::output::{open_sink, CatalogStatistics, HarvestReport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Crawls the catalog only and returns the discovered book links
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `cancel` - Stops paging before the next catalog page
pub async fn discover_links(
    config: &Config,
    cancel: &CancellationToken,
) -> crate::Result<(Vec<String>, CatalogStatistics)> {
    let fetcher = HttpFetcher::from_config(&config.http)?;
    CatalogCrawler::new(&fetcher, &config.catalog)?
        .run(cancel)
        .await
}

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client
/// 2. Page through the catalog and collect book links
/// 3. Fetch and extract every book page on the worker pool
/// 4. Checkpoint records to the configured sink and write the final snapshot
///
/// # Returns
///
/// * `Ok((catalog, report))` - Harvest finished (possibly cancelled)
/// * `Err(HarvestError)` - Setup failed before any book was fetched
///
/// # Example
///
/// ```no_run
/// use litres_harvest::config::load_config;
/// use litres_harvest::crawler::harvest;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let (catalog, report) = harvest(&config, &CancellationToken::new()).await?;
/// println!("{} links, {} records", catalog.links_discovered, report.collected);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(
    config: &Config,
    cancel: &CancellationToken,
) -> crate::Result<(CatalogStatistics, HarvestReport)> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config.http)?);

    let (links, catalog) = CatalogCrawler::new(fetcher.as_ref(), &config.catalog)?
        .run(cancel)
        .await?;

    let sink = open_sink(&config.output);
    let coordinator = Coordinator::new(
        fetcher,
        config.workers.concurrency,
        config.workers.checkpoint_interval,
    )
    .with_retry(RetryPolicy::from_config(&config.http));

    let (_, report) = coordinator.run(links, sink, cancel).await;

    Ok((catalog, report))
}
