//! URL handling module for Litres-Harvest
//!
//! This module provides canonicalization of book links, host matching against
//! the target site and the book link filter used by the catalog link extractor.

mod matcher;
mod normalize;

use crate::config::CatalogConfig;
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use url::Url;

// Re-export main functions
pub use matcher::host_matches;
pub use normalize::canonicalize_url;

/// Decides which resolved URLs point at book pages of the target site
///
/// A URL is accepted when its scheme is HTTP(S), its host matches the site host
/// (see [`host_matches`]) and its path matches the book path pattern.
#[derive(Debug, Clone)]
pub struct BookLinkFilter {
    site_host: String,
    path_pattern: Regex,
}

impl BookLinkFilter {
    /// Creates a filter from a site host and a book path regex
    ///
    /// # Examples
    ///
    /// ```
    /// use litres_harvest::url::BookLinkFilter;
    /// use url::Url;
    ///
    /// let filter = BookLinkFilter::new("litres.ru", "/book(?:/|$)").unwrap();
    /// assert!(filter.accepts(&Url::parse("https://www.litres.ru/book/a/b-1/").unwrap()));
    /// assert!(!filter.accepts(&Url::parse("https://www.litres.ru/genre/fantasy/").unwrap()));
    /// ```
    pub fn new(site_host: &str, path_pattern: &str) -> ConfigResult<Self> {
        let path_pattern = Regex::new(path_pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", path_pattern, e)))?;

        Ok(Self {
            site_host: site_host.to_ascii_lowercase(),
            path_pattern,
        })
    }

    /// Creates a filter from the catalog section of the configuration
    pub fn from_config(config: &CatalogConfig) -> ConfigResult<Self> {
        Self::new(&config.site_host, &config.book_path_pattern)
    }

    /// Returns true if the URL is a book page on the target site
    pub fn accepts(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match url.host_str() {
            Some(host) => {
                host_matches(&self.site_host, host) && self.path_pattern.is_match(url.path())
            }
            None => false,
        }
    }
}
