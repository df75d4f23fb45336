//! Bounded worker pool over an identifier queue.
//!
//! Workers pop identifiers from a shared queue until it is empty, so a slow
//! item never holds up the rest. Every identifier yields exactly one outcome:
//! a record or the error that stopped it. Failures stay with their item.

mod error;
mod processor;

pub use error::{ScrapeError, WorkQueueError};
pub use processor::{FetchExtractProcessor, ItemProcessor};

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::models::ItemOutcome;
use crate::pacing::PacingPolicy;

/// Events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        worker_id: usize,
        product_id: String,
    },
    Completed {
        worker_id: usize,
        product_id: String,
        title: String,
    },
    Failed {
        worker_id: usize,
        product_id: String,
        error: String,
    },
    /// All workers have exited.
    Finished { succeeded: usize, failed: usize },
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// `(identifier, error)` for every failed item.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Failure { product_id, error } => Some((product_id.as_str(), error.as_str())),
            ItemOutcome::Success(_) => None,
        })
    }
}

/// One identifier per line; surrounding whitespace and blank lines dropped.
pub fn parse_identifiers(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate(ids: Vec<String>) -> Result<Vec<String>, WorkQueueError> {
    let ids: Vec<String> = ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(WorkQueueError::EmptyInput);
    }
    Ok(ids)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Drains identifiers with up to `workers` concurrent tasks.
pub struct WorkerPool {
    processor: Arc<dyn ItemProcessor>,
    workers: usize,
    cooldown: Option<PacingPolicy>,
}

impl WorkerPool {
    pub fn new(processor: Arc<dyn ItemProcessor>, workers: usize) -> Self {
        Self {
            processor,
            workers: workers.max(1),
            cooldown: None,
        }
    }

    /// Rest between items when the pool runs a single worker.
    pub fn with_cooldown(mut self, pacing: PacingPolicy) -> Self {
        self.cooldown = Some(pacing);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every identifier; returns once all workers have exited.
    pub async fn run(
        &self,
        ids: Vec<String>,
        event_tx: mpsc::Sender<BatchEvent>,
    ) -> Result<BatchReport, WorkQueueError> {
        let ids = validate(ids)?;
        let total = ids.len();
        let worker_count = self.workers.min(total);
        info!("Processing {} items with {} workers", total, worker_count);

        let queue = Arc::new(Mutex::new(VecDeque::from(ids)));
        let results: Arc<Mutex<Vec<ItemOutcome>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let active = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let cooldown = if worker_count == 1 {
            self.cooldown.clone()
        } else {
            None
        };

        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let processor = self.processor.clone();
            let queue = queue.clone();
            let results = results.clone();
            let active = active.clone();
            let succeeded = succeeded.clone();
            let failed = failed.clone();
            let cooldown = cooldown.clone();
            let event_tx = event_tx.clone();

            let handle = tokio::spawn(async move {
                active.fetch_add(1, Ordering::SeqCst);

                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(product_id) = next else {
                        break;
                    };
                    let _ = event_tx
                        .send(BatchEvent::Started {
                            worker_id,
                            product_id: product_id.clone(),
                        })
                        .await;

                    // A panicking item fails alone; the worker keeps draining the queue
                    let attempt = AssertUnwindSafe(processor.process(&product_id))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| Err(ScrapeError::Panicked(panic_message(payload))));

                    let outcome = match attempt {
                        Ok(record) => {
                            succeeded.fetch_add(1, Ordering::Relaxed);
                            let _ = event_tx
                                .send(BatchEvent::Completed {
                                    worker_id,
                                    product_id: product_id.clone(),
                                    title: record.title.clone(),
                                })
                                .await;
                            ItemOutcome::Success(Box::new(record))
                        }
                        Err(e) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                            warn!("Item {} failed: {}", product_id, e);
                            let _ = event_tx
                                .send(BatchEvent::Failed {
                                    worker_id,
                                    product_id: product_id.clone(),
                                    error: e.to_string(),
                                })
                                .await;
                            ItemOutcome::Failure {
                                product_id: product_id.clone(),
                                error: e.to_string(),
                            }
                        }
                    };

                    results.lock().await.push(outcome);

                    if let Some(ref pacing) = cooldown {
                        if !queue.lock().await.is_empty() {
                            pacing.cooldown().await;
                        }
                    }
                }

                active.fetch_sub(1, Ordering::SeqCst);
                debug!("Worker {} exited", worker_id);
            });

            handles.push(handle);
        }

        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!("{}", WorkQueueError::Worker(format!("worker {}: {}", worker_id, e)));
                active.fetch_sub(1, Ordering::SeqCst);
            }
        }
        debug_assert_eq!(active.load(Ordering::SeqCst), 0);

        let report = BatchReport {
            outcomes: std::mem::take(&mut *results.lock().await),
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };

        let _ = event_tx
            .send(BatchEvent::Finished {
                succeeded: report.succeeded,
                failed: report.failed,
            })
            .await;

        info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::browser::FetchError;
    use crate::models::{Platform, ProductRecord};

    /// Sleeps a little per item, fails or panics on chosen ids, and tracks peak concurrency.
    #[derive(Default)]
    struct FakeProcessor {
        fail_on: Vec<&'static str>,
        panic_on: Vec<&'static str>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ItemProcessor for FakeProcessor {
        async fn process(&self, product_id: &str) -> Result<ProductRecord, ScrapeError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = product_id.len() as u64 % 3 + 1;
            tokio::time::sleep(Duration::from_millis(delay * 5)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on.iter().any(|id| *id == product_id) {
                panic!("processor crashed on {}", product_id);
            }
            if self.fail_on.iter().any(|id| *id == product_id) {
                return Err(FetchError::NavigationTimeout {
                    url: format!("https://item.gmarket.co.kr/Item?goodscode={}", product_id),
                    timeout_ms: 60_000,
                }
                .into());
            }
            Ok(ProductRecord::new(
                product_id,
                format!("item {}", product_id),
                Platform::Gmarket,
            ))
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    fn channel() -> (mpsc::Sender<BatchEvent>, mpsc::Receiver<BatchEvent>) {
        mpsc::channel(1024)
    }

    #[tokio::test]
    async fn every_identifier_gets_exactly_one_outcome() {
        let processor = Arc::new(FakeProcessor {
            fail_on: vec!["4", "9"],
            ..Default::default()
        });
        let pool = WorkerPool::new(processor.clone(), 4);
        let (tx, _rx) = channel();

        let report = pool.run(ids(25), tx).await.unwrap();

        assert_eq!(report.total(), 25);
        let seen: HashSet<&str> = report.outcomes.iter().map(|o| o.identifier()).collect();
        assert_eq!(seen.len(), 25);
        assert_eq!(report.succeeded, 23);
        assert_eq!(report.failed, 2);
        assert!(processor.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn third_of_five_times_out_alone() {
        let processor = Arc::new(FakeProcessor {
            fail_on: vec!["3"],
            ..Default::default()
        });
        let (tx, _rx) = channel();
        let report = WorkerPool::new(processor, 2).run(ids(5), tx).await.unwrap();

        assert_eq!(report.succeeded, 4);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "3");
        assert!(failures[0].1.contains("timed out"));
    }

    #[tokio::test]
    async fn worker_count_never_exceeds_items() {
        let processor = Arc::new(FakeProcessor::default());
        let (tx, mut rx) = channel();
        let report = WorkerPool::new(processor.clone(), 16)
            .run(ids(3), tx)
            .await
            .unwrap();
        assert_eq!(report.succeeded, 3);

        let mut workers = HashSet::new();
        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                BatchEvent::Started { worker_id, .. } => {
                    workers.insert(worker_id);
                }
                BatchEvent::Finished { succeeded, failed } => {
                    assert_eq!((succeeded, failed), (3, 0));
                    finished = true;
                }
                _ => {}
            }
        }
        assert!(finished);
        assert!(workers.iter().all(|w| *w < 3));
    }

    #[tokio::test]
    async fn single_worker_processes_in_order() {
        let processor = Arc::new(FakeProcessor::default());
        let (tx, _rx) = channel();
        let report = WorkerPool::new(processor, 1)
            .with_cooldown(PacingPolicy::immediate())
            .run(ids(4), tx)
            .await
            .unwrap();
        let order: Vec<&str> = report.outcomes.iter().map(|o| o.identifier()).collect();
        assert_eq!(order, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn panicking_item_fails_alone() {
        let processor = Arc::new(FakeProcessor {
            panic_on: vec!["2"],
            ..Default::default()
        });
        let (tx, _rx) = channel();
        let report = WorkerPool::new(processor, 2).run(ids(6), tx).await.unwrap();

        assert_eq!(report.total(), 6);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "2");
        assert!(failures[0].1.contains("processor crashed on 2"));
    }

    #[tokio::test]
    async fn single_worker_keeps_draining_after_a_panic() {
        let processor = Arc::new(FakeProcessor {
            panic_on: vec!["2"],
            ..Default::default()
        });
        let (tx, _rx) = channel();
        let report = WorkerPool::new(processor, 1).run(ids(6), tx).await.unwrap();

        assert_eq!(report.total(), 6);
        assert_eq!(report.succeeded, 5);
        assert_eq!(report.failed, 1);
        let order: Vec<&str> = report.outcomes.iter().map(|o| o.identifier()).collect();
        assert_eq!(order, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let pool = WorkerPool::new(Arc::new(FakeProcessor::default()), 3);
        let (tx, _rx) = channel();
        let err = pool
            .run(vec!["  ".to_string(), String::new()], tx)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkQueueError::EmptyInput));
    }

    #[test]
    fn identifiers_parse_one_per_line() {
        assert_eq!(
            parse_identifiers("123\n\n  456 \r\n789\n"),
            vec!["123", "456", "789"]
        );
    }
}
