//! Harvest statistics
//!
//! Counters gathered by the catalog crawler and the collector of the worker
//! pool, and their end-of-run printout.

use std::time::Duration;

/// Catalog crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Catalog pages fetched and parsed
    pub pages_fetched: u32,

    /// Catalog pages whose fetch failed
    pub pages_failed: u32,

    /// Unique book links kept after truncation to the link limit
    pub links_discovered: usize,

    /// True if the link limit stopped paging before the page limit
    pub stopped_at_link_limit: bool,
}

/// Worker pool counters, owned by the collector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestReport {
    /// Links handed to the worker pool
    pub dispatched: usize,

    /// Units that finished, successfully or not
    pub attempted: usize,

    /// Records produced
    pub collected: usize,

    /// Units whose fetch failed
    pub failed: usize,

    /// Periodic checkpoint writes that succeeded
    pub checkpoints_written: usize,

    /// Snapshot writes (periodic or final) that failed
    pub checkpoint_failures: usize,

    /// True if the harvest was cancelled before draining every link
    pub cancelled: bool,

    /// Wall time of the fetch stage
    pub elapsed: Duration,
}

impl HarvestReport {
    /// Returns the share of attempted units that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        (self.collected as f64 / self.attempted as f64) * 100.0
    }

    /// Returns the throughput of the fetch stage in units per second
    pub fn units_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.attempted as f64 / secs
    }
}

/// Prints catalog and harvest statistics to stdout
pub fn print_report(catalog: &CatalogStatistics, report: &HarvestReport) {
    println!("=== Harvest Statistics ===\n");

    println!("Catalog:");
    println!("  Pages fetched: {}", catalog.pages_fetched);
    println!("  Pages failed: {}", catalog.pages_failed);
    println!("  Book links: {}", catalog.links_discovered);
    if catalog.stopped_at_link_limit {
        println!("  Stopped early: link limit reached");
    }
    println!();

    println!("Books:");
    println!("  Dispatched: {}", report.dispatched);
    println!("  Attempted: {}", report.attempted);
    println!("  Collected: {}", report.collected);
    println!("  Failed: {}", report.failed);
    println!();

    println!("Snapshots:");
    println!("  Checkpoints written: {}", report.checkpoints_written);
    if report.checkpoint_failures > 0 {
        println!("  Failed writes: {}", report.checkpoint_failures);
    }
    println!();

    if report.cancelled {
        println!("Harvest was cancelled before all links were processed.\n");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} books collected, {:.2} books/sec)",
        report.success_rate(),
        report.collected,
        report.attempted,
        report.units_per_second()
    );
}
