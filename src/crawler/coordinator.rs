//! Parallel fetch coordinator
//!
//! This module runs the book stage of a harvest:
//! - A fixed pool of worker tasks draining a shared link queue
//! - One outcome message per link sent back over a channel
//! - A single collector that owns the record list and the counters
//! - Periodic checkpoint snapshots plus a final snapshot, written on the
//!   blocking pool

use crate::crawler::book::extract_book;
use crate::crawler::fetcher::{fetch_with_retry, FetchError, PageSource, RetryPolicy};
use crate::output::{HarvestReport, OutputError, OutputResult, SnapshotSink};
use crate::record::BookRecord;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Result of processing one book link
#[derive(Debug)]
enum UnitOutcome {
    Collected(BookRecord),
    Failed { url: String, error: FetchError },
}

type LinkQueue = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Worker pool for book pages
pub struct Coordinator<S: PageSource + 'static> {
    source: Arc<S>,
    concurrency: usize,
    checkpoint_interval: usize,
    retry: RetryPolicy,
}

impl<S: PageSource + 'static> Coordinator<S> {
    /// Creates a coordinator with `concurrency` workers
    ///
    /// Both `concurrency` and `checkpoint_interval` are clamped to at least 1.
    pub fn new(source: Arc<S>, concurrency: usize, checkpoint_interval: usize) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            checkpoint_interval: checkpoint_interval.max(1),
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches and extracts every link, returning the collected records
    ///
    /// # Flow
    ///
    /// 1. Queue all links and spawn exactly `concurrency` workers
    /// 2. Each worker takes a link, fetches it (with the retry policy) and
    ///    extracts a record, then reports the outcome
    /// 3. The collector appends records in completion order and writes a
    ///    checkpoint after every `checkpoint_interval` finished units
    /// 4. Once every worker is done, the full list is written one last time,
    ///    unless the last checkpoint already holds every finished unit
    ///
    /// Cancelling `cancel` stops workers from taking new links; units already
    /// in flight finish and the final snapshot is still written. Sink failures
    /// are logged and counted, never returned.
    pub async fn run(
        &self,
        links: Vec<String>,
        sink: Arc<dyn SnapshotSink>,
        cancel: &CancellationToken,
    ) -> (Vec<BookRecord>, HarvestReport) {
        let start = Instant::now();
        let mut report = HarvestReport {
            dispatched: links.len(),
            ..HarvestReport::default()
        };

        tracing::info!(
            "Fetching {} book pages with {} workers (checkpoint every {}, sink {})",
            links.len(),
            self.concurrency,
            self.checkpoint_interval,
            sink.describe()
        );

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        for link in links {
            if queue_tx.send(link).is_err() {
                break;
            }
        }
        drop(queue_tx);

        let (outcome_tx, mut outcome_rx) = mpsc::channel(self.concurrency * 2);
        let mut workers = self.spawn_workers(queue_rx, outcome_tx, cancel);

        let mut records: Arc<Vec<BookRecord>> = Arc::new(Vec::new());
        let mut checkpointed_at = None;
        while let Some(outcome) = outcome_rx.recv().await {
            report.attempted += 1;
            match outcome {
                UnitOutcome::Collected(record) => {
                    tracing::debug!(
                        "Collected {} ({} fields)",
                        record.url,
                        record.filled_fields()
                    );
                    Arc::make_mut(&mut records).push(record);
                    report.collected += 1;
                }
                UnitOutcome::Failed { url, error } => {
                    tracing::warn!("Failed to fetch {}: {}", url, error);
                    report.failed += 1;
                }
            }

            if report.attempted % self.checkpoint_interval == 0 {
                tracing::info!(
                    "Progress: {} / {} books processed, {} collected",
                    report.attempted,
                    report.dispatched,
                    report.collected
                );
                match write_snapshot(&sink, &records).await {
                    Ok(()) => {
                        report.checkpoints_written += 1;
                        checkpointed_at = Some(report.attempted);
                    }
                    Err(e) => {
                        tracing::error!("Checkpoint at {} books failed: {}", report.attempted, e);
                        report.checkpoint_failures += 1;
                    }
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task ended abnormally: {}", e);
            }
        }

        report.cancelled = cancel.is_cancelled() && report.attempted < report.dispatched;
        if report.cancelled {
            tracing::info!(
                "Harvest cancelled with {} links left unprocessed",
                report.dispatched - report.attempted
            );
        }

        if checkpointed_at == Some(report.attempted) {
            tracing::info!(
                "Last checkpoint already holds all {} records in {}",
                records.len(),
                sink.describe()
            );
        } else {
            match write_snapshot(&sink, &records).await {
                Ok(()) => tracing::info!(
                    "Final snapshot of {} records written to {}",
                    records.len(),
                    sink.describe()
                ),
                Err(e) => {
                    tracing::error!("Final snapshot failed: {}", e);
                    report.checkpoint_failures += 1;
                }
            }
        }

        report.elapsed = start.elapsed();
        let records = Arc::try_unwrap(records).unwrap_or_else(|shared| shared.as_ref().clone());
        (records, report)
    }

    fn spawn_workers(
        &self,
        queue: mpsc::UnboundedReceiver<String>,
        outcomes: mpsc::Sender<UnitOutcome>,
        cancel: &CancellationToken,
    ) -> JoinSet<()> {
        let queue: LinkQueue = Arc::new(Mutex::new(queue));

        let mut join_set = JoinSet::new();
        for worker_idx in 0..self.concurrency {
            let queue = Arc::clone(&queue);
            let source = Arc::clone(&self.source);
            let outcomes = outcomes.clone();
            let cancel = cancel.clone();
            let retry = self.retry;

            join_set.spawn(async move {
                run_worker(worker_idx, queue, source, retry, outcomes, cancel).await
            });
        }

        join_set
    }
}

/// Writes a snapshot on the blocking pool
///
/// The collector waits for the write before touching the list again, so the
/// shared list is back to a single owner once this returns.
async fn write_snapshot(
    sink: &Arc<dyn SnapshotSink>,
    records: &Arc<Vec<BookRecord>>,
) -> OutputResult<()> {
    let writer = Arc::clone(sink);
    let snapshot = Arc::clone(records);
    tokio::task::spawn_blocking(move || writer.write_snapshot(&snapshot))
        .await
        .unwrap_or_else(|e| {
            Err(OutputError::Write {
                path: sink.describe(),
                message: format!("snapshot task failed: {}", e),
            })
        })
}

async fn run_worker<S: PageSource>(
    worker_idx: usize,
    queue: LinkQueue,
    source: Arc<S>,
    retry: RetryPolicy,
    outcomes: mpsc::Sender<UnitOutcome>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("Worker {} stopping (cancelled)", worker_idx);
            break;
        }
        let Some(url) = next_link(&queue).await else {
            tracing::debug!("Worker {} stopping (queue drained)", worker_idx);
            break;
        };

        let outcome = match fetch_with_retry(source.as_ref(), &url, &retry).await {
            Ok(html) => UnitOutcome::Collected(extract_book(&html, &url)),
            Err(error) => UnitOutcome::Failed { url, error },
        };

        if outcomes.send(outcome).await.is_err() {
            break;
        }
    }
}

async fn next_link(queue: &LinkQueue) -> Option<String> {
    let mut guard = queue.lock().await;
    guard.recv().await
}
