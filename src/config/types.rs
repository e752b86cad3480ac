use serde::Deserialize;

/// Browser-like user agent; the catalog serves reduced markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// Main configuration structure for Litres-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub workers: WorkerConfig,
    pub output: OutputConfig,
}

/// Catalog pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// First catalog listing URL; the page parameter is set on top of it
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Host of the target site; subdomains also match
    #[serde(rename = "site-host")]
    pub site_host: String,

    /// Regex that a book page path must match
    #[serde(rename = "book-path-pattern", default = "default_book_path_pattern")]
    pub book_path_pattern: String,

    /// Query parameter carrying the catalog page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,

    /// Maximum number of catalog pages to visit
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum number of book links to collect (and books to fetch)
    #[serde(rename = "max-books")]
    pub max_books: usize,

    /// Fixed delay between consecutive catalog page fetches (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts for transient book page failures; 0 disables retry
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Base delay between retry attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent book page workers
    pub concurrency: usize,

    /// Completed units between checkpoint writes
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the snapshot file, rewritten on every checkpoint
    pub path: String,

    #[serde(default)]
    pub format: OutputFormat,

    /// Prefix CSV snapshots with a UTF-8 byte order mark
    #[serde(default = "default_bom")]
    pub bom: bool,
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

fn default_book_path_pattern() -> String {
    "/book(?:/|$)".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_bom() -> bool {
    true
}
