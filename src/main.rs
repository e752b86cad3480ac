//! Litres-Harvest main entry point
//!
//! This is the command-line interface for the catalog book harvester.

use clap::Parser;
use litres_harvest::config::{load_config_with_hash, Config};
use litres_harvest::crawler::{catalog_page_url, discover_links, harvest};
use litres_harvest::output::print_report;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Litres-Harvest: a catalog book metadata harvester
///
/// Pages through a book catalog, collects the book links it lists, then
/// fetches every book page in parallel and writes the extracted metadata to a
/// CSV or JSON snapshot, checkpointing as it goes.
#[derive(Parser, Debug)]
#[command(name = "litres-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A catalog book metadata harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which catalog pages would be visited
    #[arg(long, conflicts_with = "links_only")]
    dry_run: bool,

    /// Crawl the catalog and print the book links without fetching books
    #[arg(long, conflicts_with = "dry_run")]
    links_only: bool,

    /// Override the maximum number of books to harvest
    #[arg(long, value_name = "N")]
    max_books: Option<usize>,

    /// Override the number of parallel workers
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    apply_overrides(&mut config, &cli)?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    if cli.links_only {
        handle_links_only(&config, &cancel).await
    } else {
        handle_harvest(&config, &cancel).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("litres_harvest=info,warn"),
            1 => EnvFilter::new("litres_harvest=debug,info"),
            2 => EnvFilter::new("litres_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(max_books) = cli.max_books {
        if max_books == 0 {
            return Err("--max-books must be at least 1".into());
        }
        tracing::info!("Overriding max-books: {}", max_books);
        config.catalog.max_books = max_books;
    }

    if let Some(concurrency) = cli.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("--concurrency must be between 1 and 100".into());
        }
        tracing::info!("Overriding concurrency: {}", concurrency);
        config.workers.concurrency = concurrency;
    }

    Ok(())
}

/// Cancels the harvest on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight books and writing final snapshot");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: validates config and shows what would be visited
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Litres-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  Start URL: {}", config.catalog.start_url);
    println!("  Site host: {}", config.catalog.site_host);
    println!("  Book path pattern: {}", config.catalog.book_path_pattern);
    println!("  Max pages: {}", config.catalog.max_pages);
    println!("  Max books: {}", config.catalog.max_books);
    println!("  Request delay: {}ms", config.catalog.request_delay_ms);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.http.max_retries, config.http.retry_backoff_ms
    );

    println!("\nWorkers:");
    println!("  Concurrency: {}", config.workers.concurrency);
    println!(
        "  Checkpoint interval: {}",
        config.workers.checkpoint_interval
    );

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Format: {:?}", config.output.format);

    let start = Url::parse(&config.catalog.start_url)?;
    let shown = config.catalog.max_pages.min(3);
    println!("\nFirst catalog pages:");
    for page in 1..=shown {
        println!(
            "  {}",
            catalog_page_url(&start, &config.catalog.page_param, page)
        );
    }
    if config.catalog.max_pages > shown {
        println!("  ... ({} pages in total)", config.catalog.max_pages);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --links-only mode: prints discovered book links
async fn handle_links_only(
    config: &Config,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let (links, catalog) = discover_links(config, cancel).await?;

    for link in &links {
        println!("{}", link);
    }
    tracing::info!(
        "{} book links from {} catalog pages ({} failed)",
        catalog.links_discovered,
        catalog.pages_fetched,
        catalog.pages_failed
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting up to {} books from {} catalog pages with {} workers",
        config.catalog.max_books,
        config.catalog.max_pages,
        config.workers.concurrency
    );

    match harvest(config, cancel).await {
        Ok((catalog, report)) => {
            tracing::info!("Harvest finished in {:?}", report.elapsed);
            print_report(&catalog, &report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
