//! Transaction Dispatcher
//!
//! A fixed-size pool of workers draining one bounded queue of submitted
//! transactions. Submission applies backpressure: a full queue suspends the
//! submitter instead of dropping work or growing without bound. A single
//! process-wide cancellation token stops future dequeues; items already
//! dequeued run to completion, items still queued are not drained.
//!
//! Ordering: none across accounts. For a single account, enqueue order
//! follows creation order, but two workers holding two transactions for the
//! same account race for that account's lock — a later-dequeued-but-faster
//! worker can win. Weak same-account FIFO, not a guarantee.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::Transaction;
use crate::error::{EngineError, EngineResult};

/// Processing hook invoked by workers, one transaction at a time.
#[async_trait]
pub trait TransactionProcessor: Send + Sync {
    async fn process(&self, tx: Transaction) -> EngineResult<()>;
}

/// Pool sizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            queue_capacity: 100,
        }
    }
}

/// Read-only snapshot of the pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub processed: u64,
    pub errors: u64,
}

impl PoolStats {
    pub fn total(&self) -> u64 {
        self.processed + self.errors
    }
}

#[derive(Default)]
struct Counters {
    processed: AtomicU64,
    errors: AtomicU64,
}

/// Fixed worker pool over a bounded queue. Started exactly once (by
/// construction), cancelled exactly once (by [`WorkerPool::shutdown`]);
/// there is no dynamic resizing.
pub struct WorkerPool {
    queue: mpsc::Sender<Transaction>,
    cancel: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl WorkerPool {
    /// Spawn the workers and return the running pool.
    pub fn start(config: PoolConfig, processor: Arc<dyn TransactionProcessor>) -> Self {
        let worker_count = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);

        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let cancel = CancellationToken::new();
        let counters = Arc::new(Counters::default());

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    queue_rx.clone(),
                    processor.clone(),
                    cancel.clone(),
                    counters.clone(),
                ))
            })
            .collect();

        tracing::info!(
            workers = worker_count,
            queue_capacity,
            "worker pool started"
        );

        Self {
            queue: queue_tx,
            cancel,
            workers: Mutex::new(workers),
            counters,
        }
    }

    /// Enqueue a transaction for asynchronous processing. Suspends while the
    /// queue is full; fails only once the pool has shut down.
    pub async fn submit(&self, tx: Transaction) -> EngineResult<()> {
        self.queue
            .send(tx)
            .await
            .map_err(|_| EngineError::QueueClosed)
    }

    /// Snapshot of the processed/error counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            processed: self.counters.processed.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
        }
    }

    /// Cancel the pool and join all workers. In-flight transactions finish;
    /// transactions still queued are dropped with the queue. Call once.
    pub async fn shutdown(&self) -> PoolStats {
        self.cancel.cancel();

        let workers: Vec<_> = self.workers.lock().await.drain(..).collect();
        for handle in workers {
            let _ = handle.await;
        }

        let stats = self.stats();
        tracing::info!(
            processed = stats.processed,
            errors = stats.errors,
            "worker pool stopped"
        );
        stats
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Transaction>>>,
    processor: Arc<dyn TransactionProcessor>,
    cancel: CancellationToken,
    counters: Arc<Counters>,
) {
    loop {
        // Hold the receiver only while dequeuing. The cancellation arm is
        // biased ahead of the queue so a stopped pool never dequeues more
        // work, even when items are still waiting.
        let tx = {
            let mut queue = queue.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                received = queue.recv() => match received {
                    Some(tx) => tx,
                    None => return,
                },
            }
        };

        let tx_id = tx.id;
        let kind = tx.kind;

        // Each transaction runs in its own task so a panic is contained to
        // that item: it surfaces as a JoinError, is counted, and the worker
        // moves on.
        let outcome = tokio::spawn({
            let processor = processor.clone();
            async move { processor.process(tx).await }
        })
        .await;

        match outcome {
            Ok(Ok(())) => {
                counters.processed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(worker_id, tx_id, "transaction processed");
            }
            Ok(Err(err)) => {
                counters.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    worker_id,
                    tx_id,
                    kind = %kind,
                    error = %err,
                    "failed to process transaction"
                );
            }
            Err(join_err) => {
                counters.errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    worker_id,
                    tx_id,
                    kind = %kind,
                    "transaction processing panicked: {join_err}"
                );
            }
        }
    }
}
