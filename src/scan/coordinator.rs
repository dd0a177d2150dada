//! Scan coordinator - orchestrates the recursive scan
//!
//! The coordinator is responsible for:
//! - Building the shared scan context (queue, visited set, executor, sink)
//! - Seeding one task per dictionary entry under the target
//! - Spawning and joining the worker threads
//! - Exposing a cancellation handle (Ctrl-C)
//! - Final statistics

use crate::config::{ScanConfig, DEFAULT_SCAN_DEPTH};
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::http::{HttpExecutor, RequestExecutor};
use crate::output::ResultSink;
use crate::scan::classifier::RecursionPolicy;
use crate::scan::queue::TaskQueue;
use crate::scan::task::{root_base, ScanResult, ScanTask};
use crate::scan::visited::VisitedSet;
use crate::scan::worker::{aggregate_stats, Worker};
use reqwest::Url;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Engine settings for one run
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Base URL; its path is the root of the scan
    pub target: Url,

    /// Number of worker threads (at least 1)
    pub worker_count: usize,

    /// Recursion trigger
    pub recursion: RecursionPolicy,

    /// Tasks at this depth or deeper are never expanded; `None` is unlimited
    pub max_depth: Option<usize>,
}

impl ScanOptions {
    /// Options with defaults for everything but the target
    pub fn new(target: Url) -> Self {
        Self {
            target,
            worker_count: 1,
            recursion: RecursionPolicy::default(),
            max_depth: Some(DEFAULT_SCAN_DEPTH),
        }
    }
}

/// Result of a finished scan
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Requests issued
    pub requests: u64,

    /// Requests that failed at the transport level
    pub failures: u64,

    /// Results that were expanded into a new generation
    pub directories: u64,

    /// Tasks dropped because their path was already visited
    pub duplicates_skipped: u64,

    /// Time taken for the scan
    pub duration: Duration,

    /// Whether the scan completed (vs was cancelled)
    pub completed: bool,
}

impl ScanSummary {
    /// Calculate request rate
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            0.0
        }
    }
}

/// State shared by the coordinator and every worker
pub(crate) struct ScanContext {
    pub(crate) target: Url,
    pub(crate) dictionary: Arc<Dictionary>,
    pub(crate) queue: TaskQueue,
    pub(crate) visited: VisitedSet,
    pub(crate) executor: Arc<dyn RequestExecutor>,
    pub(crate) sink: Arc<dyn ResultSink>,
    pub(crate) recursion: RecursionPolicy,
    pub(crate) max_depth: Option<usize>,
}

impl ScanContext {
    /// Enqueue `task` unless its path was already admitted
    pub(crate) fn schedule(&self, task: ScanTask) -> bool {
        if !self.visited.insert(&task.path) {
            trace!(path = %task.path, "Already visited");
            return false;
        }
        self.queue.enqueue(task)
    }

    /// Whether `result` opens a new generation
    pub(crate) fn should_expand(&self, result: &ScanResult) -> bool {
        let within_depth = self
            .max_depth
            .map_or(true, |max| result.task.depth < max);
        within_depth && self.recursion.should_recurse(result)
    }

    /// Enqueue one child per dictionary entry under `parent`
    ///
    /// Returns (scheduled, duplicates).
    pub(crate) fn expand(&self, parent: &ScanTask) -> (usize, usize) {
        let base = parent.child_base();
        self.schedule_all(&base, parent.depth + 1)
    }

    fn schedule_all(&self, base: &str, depth: usize) -> (usize, usize) {
        let mut scheduled = 0;
        let mut duplicates = 0;

        for fragment in self.dictionary.iter() {
            if self.queue.is_cancelled() {
                break;
            }
            if self.schedule(ScanTask::new(base, fragment.clone(), depth)) {
                scheduled += 1;
            } else if !self.queue.is_cancelled() {
                duplicates += 1;
            }
        }

        (scheduled, duplicates)
    }
}

/// Cloneable handle that can cancel a running scan
#[derive(Clone)]
pub struct ScanHandle {
    ctx: Arc<ScanContext>,
}

impl ScanHandle {
    /// Stop dequeuing, discard queued tasks and let workers exit
    ///
    /// In-flight requests finish (bounded by the request timeout).
    pub fn cancel(&self) {
        self.ctx.queue.cancel();
    }

    /// Check if the scan has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.ctx.queue.is_cancelled()
    }
}

/// Coordinates the parallel recursive scan
pub struct ScanCoordinator {
    /// Shared state
    ctx: Arc<ScanContext>,

    /// Number of workers to spawn
    worker_count: usize,

    /// Worker threads
    workers: Vec<Worker>,
}

impl ScanCoordinator {
    /// Create a new scan coordinator
    pub fn new(
        options: ScanOptions,
        dictionary: Arc<Dictionary>,
        executor: Arc<dyn RequestExecutor>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let ctx = ScanContext {
            target: options.target,
            dictionary,
            queue: TaskQueue::new(),
            visited: VisitedSet::new(),
            executor,
            sink,
            recursion: options.recursion,
            max_depth: options.max_depth,
        };

        Self {
            ctx: Arc::new(ctx),
            worker_count: options.worker_count.max(1),
            workers: Vec::new(),
        }
    }

    /// Load the dictionary, build the HTTP client and create a coordinator
    ///
    /// Every fallible preparation step runs here, so a bad dictionary or
    /// client configuration fails before any scan request is issued.
    pub fn from_config(config: &ScanConfig, sink: Arc<dyn ResultSink>) -> Result<Self> {
        let dictionary = Dictionary::load(&config.dictionary, config.http.timeout)?;
        let executor = HttpExecutor::new(&config.http, &config.target)?;

        Ok(Self::new(
            config.scan_options(),
            Arc::new(dictionary),
            Arc::new(executor),
            sink,
        ))
    }

    /// Get a cancellation handle (for signal handlers)
    pub fn handle(&self) -> ScanHandle {
        ScanHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Dictionary used by this scan
    pub fn dictionary(&self) -> &Dictionary {
        &self.ctx.dictionary
    }

    /// Run the scan to quiescence or cancellation
    pub fn run(mut self) -> Result<ScanSummary> {
        let start_time = Instant::now();

        info!(
            url = %self.ctx.target,
            workers = self.worker_count,
            entries = self.ctx.dictionary.len(),
            recursion = self.ctx.recursion.as_str(),
            "Starting scan"
        );

        // Hold the queue open so workers don't see an idle state before seeding
        let ctx = Arc::clone(&self.ctx);
        let seeding = ctx.queue.hold();

        // Spawn workers
        if let Err(e) = self.spawn_workers() {
            drop(seeding);
            ctx.queue.cancel();
            self.join_workers();
            return Err(e.into());
        }

        // Seed the queue
        let root = root_base(&ctx.target);
        let (seeded, seed_duplicates) = ctx.schedule_all(&root, 0);
        debug!(root = %root, seeded = seeded, duplicates = seed_duplicates, "Queue seeded");
        drop(seeding);

        // Workers exit once the queue goes idle or is cancelled
        let (requests, failures, directories, duplicates) = self.join_workers();

        let completed = !ctx.queue.is_cancelled();
        let duration = start_time.elapsed();

        if completed {
            info!(
                requests = requests,
                failures = failures,
                directories = directories,
                unique_paths = ctx.visited.admitted(),
                dequeued = ctx.queue.stats().throughput(),
                duration_ms = duration.as_millis() as u64,
                "Scan completed"
            );
        } else {
            info!(
                requests = requests,
                discarded = self.ctx.queue.stats().discarded_count(),
                "Scan cancelled"
            );
        }

        Ok(ScanSummary {
            requests,
            failures,
            directories,
            duplicates_skipped: duplicates + seed_duplicates as u64,
            duration,
            completed,
        })
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> std::result::Result<(), crate::error::WorkerError> {
        for id in 0..self.worker_count {
            let worker = Worker::spawn(id, Arc::clone(&self.ctx))?;
            self.workers.push(worker);
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Join all worker threads and collect final stats
    fn join_workers(&mut self) -> (u64, u64, u64, u64) {
        for worker in &mut self.workers {
            trace!(worker = worker.id(), "Joining worker");
            if let Err(e) = worker.join() {
                warn!(worker = worker.id(), error = %e, "Worker failed to join cleanly");
            }
        }

        aggregate_stats(&self.workers)
    }
}
