use crate::config::types::{CatalogConfig, Config, HttpConfig, OutputConfig, WorkerConfig};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_catalog_config(&config.catalog)?;
    validate_http_config(&config.http)?;
    validate_worker_config(&config.workers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates catalog pagination configuration
fn validate_catalog_config(config: &CatalogConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "start-url '{}' must use HTTP or HTTPS",
            config.start_url
        )));
    }

    validate_site_host(&config.site_host)?;

    Regex::new(&config.book_path_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "book-path-pattern '{}': {}",
            config.book_path_pattern, e
        ))
    })?;

    if config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "page-param cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_books < 1 {
        return Err(ConfigError::Validation(format!(
            "max-books must be >= 1, got {}",
            config.max_books
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates worker pool configuration
fn validate_worker_config(config: &WorkerConfig) -> ConfigResult<()> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation("output path cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates the target site host (a bare domain or IP address, no port)
fn validate_site_host(host: &str) -> ConfigResult<()> {
    if host.is_empty() {
        return Err(ConfigError::Validation(
            "site-host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "site-host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "site-host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::Validation(format!(
            "site-host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
