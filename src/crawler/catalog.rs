//! Catalog crawler
//!
//! Pages sequentially through the catalog listing, collecting deduplicated book
//! links until the page limit or the link limit is reached. Consecutive page
//! fetches are separated by a fixed delay.

use crate::config::CatalogConfig;
use crate::crawler::fetcher::PageSource;
use crate::crawler::links::extract_links;
use crate::output::CatalogStatistics;
use crate::state::{CatalogPhase, LinkSet};
use crate::url::BookLinkFilter;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Builds the URL of a catalog page
///
/// The page parameter is replaced if the start URL already carries one, so
/// every page number maps to exactly one URL.
///
/// # Example
///
/// ```
/// use litres_harvest::crawler::catalog_page_url;
/// use url::Url;
///
/// let start = Url::parse("https://www.litres.ru/popular/?art_types=text_book").unwrap();
/// let page = catalog_page_url(&start, "page", 3);
/// assert_eq!(page.as_str(), "https://www.litres.ru/popular/?art_types=text_book&page=3");
/// ```
pub fn catalog_page_url(start: &Url, page_param: &str, page: u32) -> Url {
    let kept: Vec<(String, String)> = start
        .query_pairs()
        .filter(|(key, _)| key != page_param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = start.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(page_param, &page.to_string());
    }
    url
}

/// Sequential catalog crawler
///
/// Owns the crawl phase and the discovered link set; nothing here is shared
/// with other tasks.
pub struct CatalogCrawler<'a, S: PageSource> {
    source: &'a S,
    filter: BookLinkFilter,
    start_url: Url,
    page_param: String,
    max_pages: u32,
    max_links: usize,
    delay: Duration,
    phase: CatalogPhase,
    links: LinkSet,
    stats: CatalogStatistics,
}

impl<'a, S: PageSource> CatalogCrawler<'a, S> {
    /// Creates a crawler from the catalog configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogCrawler)` - Ready to crawl
    /// * `Err(HarvestError)` - Invalid start URL or book path pattern
    pub fn new(source: &'a S, config: &CatalogConfig) -> crate::Result<Self> {
        Ok(Self {
            source,
            filter: BookLinkFilter::from_config(config)?,
            start_url: Url::parse(&config.start_url)?,
            page_param: config.page_param.clone(),
            max_pages: config.max_pages.max(1),
            max_links: config.max_books,
            delay: Duration::from_millis(config.request_delay_ms),
            phase: CatalogPhase::Idle,
            links: LinkSet::new(),
            stats: CatalogStatistics::default(),
        })
    }

    /// Overrides the link limit (and therefore the number of books fetched)
    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    /// Runs the crawl to completion
    ///
    /// # Flow
    ///
    /// For each page from 1 to the page limit:
    /// 1. Wait the inter-request delay (skipped before the first page)
    /// 2. Fetch the page; a failure is logged and the crawl moves on
    /// 3. Union the page's book links into the link set
    /// 4. Stop early once the link limit is reached
    ///
    /// Cancelling `cancel` stops paging before the next fetch.
    ///
    /// # Returns
    ///
    /// * `Ok((links, stats))` - Links in discovery order, truncated to the limit
    /// * `Err(HarvestError)` - Invalid phase transition (crawler reused)
    pub async fn run(
        mut self,
        cancel: &CancellationToken,
    ) -> crate::Result<(Vec<String>, CatalogStatistics)> {
        for page in 1..=self.max_pages {
            self.phase.transition(CatalogPhase::Paging { page })?;

            if page > 1 && !self.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
            if cancel.is_cancelled() {
                tracing::info!("Catalog crawl cancelled before page {}", page);
                break;
            }

            self.crawl_page(page).await;

            if self.links.len() >= self.max_links {
                tracing::info!(
                    "Link limit of {} reached after page {}",
                    self.max_links,
                    page
                );
                self.stats.stopped_at_link_limit = page < self.max_pages;
                break;
            }
        }

        self.phase.transition(CatalogPhase::Done)?;

        self.links.truncate(self.max_links);
        self.stats.links_discovered = self.links.len();

        tracing::info!(
            "Catalog crawl finished: {} unique book links from {} pages ({} failed)",
            self.stats.links_discovered,
            self.stats.pages_fetched,
            self.stats.pages_failed
        );

        Ok((self.links.into_vec(), self.stats))
    }

    /// Fetches one catalog page and merges its links
    async fn crawl_page(&mut self, page: u32) {
        let page_url = catalog_page_url(&self.start_url, &self.page_param, page);

        let html = match self.source.fetch(page_url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Catalog page {} ({}) failed: {}", page, page_url, e);
                self.stats.pages_failed += 1;
                return;
            }
        };
        self.stats.pages_fetched += 1;

        let found = extract_links(&html, &page_url, &self.filter);
        let found_count = found.len();
        let added = self.links.extend(found);

        tracing::info!(
            "Page {}: found {} links, {} new, {} unique in total",
            page,
            found_count,
            added,
            self.links.len()
        );
    }
}
