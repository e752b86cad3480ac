use litres_harvest::config::{
    CatalogConfig, Config, HttpConfig, OutputConfig, OutputFormat, WorkerConfig,
};
use litres_harvest::crawler::{discover_links, harvest};
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_path: &Path, max_pages: u32, max_books: usize) -> Config {
    Config {
        catalog: CatalogConfig {
            start_url: format!("{}/popular/?art_types=text_book", base_url),
            site_host: "127.0.0.1".to_string(),
            book_path_pattern: "/book(?:/|$)".to_string(),
            page_param: "page".to_string(),
            max_pages,
            max_books,
            request_delay_ms: 0,
        },
        http: HttpConfig {
            timeout_secs: 5,
            ..HttpConfig::default()
        },
        workers: WorkerConfig {
            concurrency: 3,
            checkpoint_interval: 2,
        },
        output: OutputConfig {
            path: output_path.display().to_string(),
            format: OutputFormat::Csv,
            bom: true,
        },
    }
}

fn catalog_page(books: impl IntoIterator<Item = u32>) -> String {
    let anchors: String = books
        .into_iter()
        .map(|n| format!(r#"<a href="/book/author/title-{}/?lfrom=42">Book {}</a>"#, n, n))
        .collect();
    format!(
        r#"<html><body>
        <a href="/genre/fantasy/">Fantasy</a>
        {}
        <a href="/popular/?page=2">Next</a>
        </body></html>"#,
        anchors
    )
}

fn book_page(n: u32) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">
        {{"@type":"Book","name":"Книга {n}","author":{{"@type":"Person","name":"Автор {n}"}},
          "aggregateRating":{{"ratingValue":"4.{n}","ratingCount":"10"}},
          "offers":{{"price":"99"}}}}
        </script></head><body>
        <div data-testid="book-description__text"><p>Описание {n}.</p></div>
        </body></html>"#,
        n = n
    )
}

async fn mount_catalog_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/popular/"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_book(server: &MockServer, n: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/book/author/title-{}/", n)))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page(n)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_writes_csv() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(1..=3)).await;
    mount_catalog_page(&server, 2, catalog_page(4..=6)).await;
    for n in 1..=5 {
        mount_book(&server, n).await;
    }
    // book 6 is not mounted and answers 404

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("books.csv");
    let config = create_test_config(&server.uri(), &output, 2, 100);

    let (catalog, report) = harvest(&config, &CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(catalog.pages_fetched, 2);
    assert_eq!(catalog.links_discovered, 6);
    assert_eq!(report.dispatched, 6);
    assert_eq!(report.attempted, 6);
    assert_eq!(report.collected, 5);
    assert_eq!(report.failed, 1);
    assert_eq!(report.checkpoints_written, 3);
    assert!(!report.cancelled);

    let bytes = std::fs::read(&output).expect("Snapshot missing");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "Expected UTF-8 BOM");

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers = reader.headers().expect("Missing header").clone();
    assert_eq!(headers.get(0), Some("url"));
    assert_eq!(headers.get(15), Some("description"));

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("Bad row")).collect();
    assert_eq!(rows.len(), 5);

    let book_3 = rows
        .iter()
        .find(|row| row.get(0) == Some(&format!("{}/book/author/title-3/", server.uri())[..]))
        .expect("Book 3 missing from snapshot");
    assert_eq!(book_3.get(1), Some("Книга 3"));
    assert_eq!(book_3.get(2), Some("Автор 3"));
    assert_eq!(book_3.get(15), Some("Описание 3."));

    assert!(
        !output.with_file_name("books.csv.partial").exists(),
        "Temporary snapshot left behind"
    );
}

#[tokio::test]
async fn test_json_output() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(1..=2)).await;
    mount_book(&server, 1).await;
    mount_book(&server, 2).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("books.json");
    let mut config = create_test_config(&server.uri(), &output, 1, 100);
    config.output.format = OutputFormat::Json;

    let (_, report) = harvest(&config, &CancellationToken::new())
        .await
        .expect("Harvest failed");
    assert_eq!(report.collected, 2);

    let content = std::fs::read_to_string(&output).expect("Snapshot missing");
    let records: Vec<serde_json::Value> = serde_json::from_str(&content).expect("Invalid JSON");
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record["url"].as_str().is_some());
        assert_eq!(record["price"], serde_json::json!(99.0));
    }
}

#[tokio::test]
async fn test_failed_catalog_page_is_skipped() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(1..=2)).await;
    Mock::given(method("GET"))
        .and(path("/popular/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_catalog_page(&server, 3, catalog_page(3..=4)).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), &dir.path().join("books.csv"), 3, 100);

    let (links, catalog) = discover_links(&config, &CancellationToken::new())
        .await
        .expect("Catalog crawl failed");

    assert_eq!(catalog.pages_fetched, 2);
    assert_eq!(catalog.pages_failed, 1);
    assert_eq!(
        links,
        (1..=4)
            .map(|n| format!("{}/book/author/title-{}/", server.uri(), n))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_link_limit_keeps_first_discovered() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(0..10)).await;
    mount_catalog_page(&server, 2, catalog_page(10..20)).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), &dir.path().join("books.csv"), 2, 15);

    let (links, catalog) = discover_links(&config, &CancellationToken::new())
        .await
        .expect("Catalog crawl failed");

    assert_eq!(links.len(), 15);
    assert_eq!(catalog.links_discovered, 15);
    assert_eq!(
        links,
        (0..15)
            .map(|n| format!("{}/book/author/title-{}/", server.uri(), n))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_transient_book_failure_is_retried() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(1..=1)).await;
    Mock::given(method("GET"))
        .and(path("/book/author/title-1/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_book(&server, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), &dir.path().join("books.csv"), 1, 100);
    config.http.max_retries = 2;
    config.http.retry_backoff_ms = 1;

    let (_, report) = harvest(&config, &CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.collected, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_transient_failure_without_retry_is_dropped() {
    let server = MockServer::start().await;
    mount_catalog_page(&server, 1, catalog_page(1..=2)).await;
    Mock::given(method("GET"))
        .and(path("/book/author/title-1/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_book(&server, 2).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), &dir.path().join("books.csv"), 1, 100);

    let (_, report) = harvest(&config, &CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.attempted, 2);
    assert_eq!(report.collected, 1);
    assert_eq!(report.failed, 1);
}
