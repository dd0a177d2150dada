//! Worker thread logic for the parallel scan
//!
//! Each worker:
//! - Pulls tasks from the shared task queue (blocking, no polling)
//! - Requests the task's URL through the shared request executor
//! - Classifies the outcome and enqueues the next generation if needed
//! - Forwards the result to the result sink
//! - Marks the task done, which may signal quiescence

use crate::error::WorkerError;
use crate::scan::coordinator::ScanContext;
use crate::scan::task::{ScanResult, ScanTask};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Requests issued
    pub requests: AtomicU64,

    /// Requests that failed at the transport level
    pub failures: AtomicU64,

    /// Results expanded into a new generation
    pub directories: AtomicU64,

    /// Child tasks dropped because their path was already visited
    pub duplicates: AtomicU64,
}

impl WorkerStats {
    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_directory(&self) {
        self.directories.fetch_add(1, Ordering::Relaxed);
    }

    fn record_duplicates(&self, count: u64) {
        self.duplicates.fetch_add(count, Ordering::Relaxed);
    }
}

/// A worker thread that processes scan tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub(crate) fn spawn(id: usize, ctx: Arc<ScanContext>) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("scanner-{}", id))
            .spawn(move || worker_loop(id, &ctx, &stats_clone))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(&mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|panic| WorkerError::Panicked {
                id: self.id,
                message: panic_message(panic.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Main worker loop
fn worker_loop(id: usize, ctx: &ScanContext, stats: &WorkerStats) {
    debug!(worker = id, "Worker starting");

    while let Some(task) = ctx.queue.dequeue() {
        // Released after the result and any children are handed off
        let _done = ctx.queue.completion_guard();
        process_task(id, &task, ctx, stats);
    }

    debug!(
        worker = id,
        requests = stats.requests.load(Ordering::Relaxed),
        failures = stats.failures.load(Ordering::Relaxed),
        "Worker shutting down"
    );
}

/// Execute one task
fn process_task(worker_id: usize, task: &ScanTask, ctx: &ScanContext, stats: &WorkerStats) {
    let url = task.url(&ctx.target);
    trace!(worker = worker_id, url = %url, depth = task.depth, "Requesting");

    let outcome = ctx.executor.execute(&url);
    stats.record_request();
    if outcome.is_err() {
        stats.record_failure();
    }

    let result = ScanResult::new(task.clone(), url, outcome);

    if ctx.should_expand(&result) {
        stats.record_directory();
        let (scheduled, duplicates) = ctx.expand(task);
        stats.record_duplicates(duplicates as u64);
        debug!(
            worker = worker_id,
            path = %task.path,
            children = scheduled,
            duplicates = duplicates,
            "Directory found, recursing"
        );
    }

    ctx.sink.record(result);
}

/// Aggregate statistics from multiple workers
pub fn aggregate_stats(workers: &[Worker]) -> (u64, u64, u64, u64) {
    let mut requests = 0u64;
    let mut failures = 0u64;
    let mut directories = 0u64;
    let mut duplicates = 0u64;

    for worker in workers {
        requests += worker.stats.requests.load(Ordering::Relaxed);
        failures += worker.stats.failures.load(Ordering::Relaxed);
        directories += worker.stats.directories.load(Ordering::Relaxed);
        duplicates += worker.stats.duplicates.load(Ordering::Relaxed);
    }

    (requests, failures, directories, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();

        stats.record_request();
        stats.record_request();
        stats.record_failure();
        stats.record_directory();
        stats.record_duplicates(3);

        assert_eq!(stats.requests.load(Ordering::Relaxed), 2);
        assert_eq!(stats.failures.load(Ordering::Relaxed), 1);
        assert_eq!(stats.directories.load(Ordering::Relaxed), 1);
        assert_eq!(stats.duplicates.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
