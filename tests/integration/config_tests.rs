use litres_harvest::config::{load_config_with_hash, parse_config, OutputFormat};
use litres_harvest::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[catalog]
start-url = "https://www.litres.ru/popular/?art_types=text_book&only_selfpublished_arts=true"
site-host = "litres.ru"
book-path-pattern = "/book/"
page-param = "p"
max-pages = 5
max-books = 15000
request-delay-ms = 300

[http]
user-agent = "TestBot/1.0"
timeout-secs = 20
max-retries = 2
retry-backoff-ms = 500

[workers]
concurrency = 15
checkpoint-interval = 50

[output]
path = "litres_books_parallel.json"
format = "json"
bom = false
"#;

#[test]
fn test_every_key_is_read() {
    let config = parse_config(FULL_CONFIG).expect("Config should be valid");

    assert_eq!(config.catalog.book_path_pattern, "/book/");
    assert_eq!(config.catalog.page_param, "p");
    assert_eq!(config.catalog.max_books, 15000);
    assert_eq!(config.http.user_agent, "TestBot/1.0");
    assert_eq!(config.http.max_retries, 2);
    assert_eq!(config.workers.checkpoint_interval, 50);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(!config.output.bom);
}

#[test]
fn test_hash_is_stable_for_same_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(FULL_CONFIG.as_bytes()).expect("Failed to write config");
    file.flush().expect("Failed to flush config");

    let (_, first) = load_config_with_hash(file.path()).expect("Failed to load");
    let (_, second) = load_config_with_hash(file.path()).expect("Failed to load");

    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn test_zero_concurrency_rejected() {
    let broken = FULL_CONFIG.replace("concurrency = 15", "concurrency = 0");
    assert!(matches!(
        parse_config(&broken),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_unknown_format_rejected() {
    let broken = FULL_CONFIG.replace(r#"format = "json""#, r#"format = "xlsx""#);
    assert!(matches!(parse_config(&broken), Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_config_with_hash(std::path::Path::new("/nonexistent/harvest.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
