//! Task queue with quiescence detection
//!
//! Tasks travel over an unbounded crossbeam channel. Termination is tracked
//! separately with an outstanding-task counter:
//!
//! - every [`TaskQueue::enqueue`] increments it
//! - every completed task decrements it exactly once ([`TaskQueue::mark_done`],
//!   usually through a [`CompletionGuard`])
//!
//! A task's follow-up tasks are enqueued before the task itself is marked done,
//! so the counter can only reach zero when nothing is queued and nothing is in
//! flight. When it does, the idle channel is closed, which wakes every worker
//! blocked in [`TaskQueue::dequeue`] at once. No polling is involved.

use crate::scan::task::ScanTask;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,

    /// Tasks thrown away by cancellation
    pub discarded: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued tasks)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get number of discarded tasks
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

/// Multi-producer, multi-consumer task queue shared by the engine and workers
pub struct TaskQueue {
    /// Sender for adding tasks
    sender: Sender<ScanTask>,

    /// Receiver for getting tasks
    receiver: Receiver<ScanTask>,

    /// Enqueued but not yet completed tasks (plus any held seeding slots)
    outstanding: AtomicUsize,

    /// Dropped when the queue goes idle; never carries a message
    idle_tx: Mutex<Option<Sender<()>>>,

    /// Disconnects once `idle_tx` is dropped
    idle_rx: Receiver<()>,

    /// Set once the scan has been cancelled
    cancelled: AtomicBool,

    /// Enqueues hold it shared, cancel holds it exclusive, so no task can
    /// slip in between the cancelled check and the drain
    gate: RwLock<()>,

    /// Queue statistics
    stats: QueueStats,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        let (idle_tx, idle_rx) = unbounded();

        Self {
            sender,
            receiver,
            outstanding: AtomicUsize::new(0),
            idle_tx: Mutex::new(Some(idle_tx)),
            idle_rx,
            cancelled: AtomicBool::new(false),
            gate: RwLock::new(()),
            stats: QueueStats::default(),
        }
    }

    /// Hold the queue open while seeding
    ///
    /// Counts as one outstanding task until the guard drops, so workers that
    /// drain the first seeds cannot observe a premature idle state. Dropping
    /// the guard with nothing enqueued closes the queue immediately.
    pub fn hold(&self) -> CompletionGuard<'_> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        CompletionGuard { queue: self }
    }

    /// Add a task
    ///
    /// Returns `false` only when the scan has been cancelled.
    pub fn enqueue(&self, task: ScanTask) -> bool {
        let _gate = self.gate.read();
        if self.is_cancelled() {
            return false;
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(task).is_err() {
            // The queue owns its receiver, so this cannot disconnect
            self.mark_done();
            return false;
        }

        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Take the next task, blocking until one is available
    ///
    /// Returns `None` once the queue is idle or cancelled. Every `Some` must be
    /// paired with one [`mark_done`](Self::mark_done).
    pub fn dequeue(&self) -> Option<ScanTask> {
        if self.is_cancelled() {
            return None;
        }

        let task = select! {
            recv(self.receiver) -> task => task.ok(),
            recv(self.idle_rx) -> _ => None,
        };

        let task = task?;
        if self.is_cancelled() {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            self.mark_done();
            return None;
        }

        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(task)
    }

    /// Guard that marks the current task done when dropped
    pub fn completion_guard(&self) -> CompletionGuard<'_> {
        CompletionGuard { queue: self }
    }

    /// Record that a task and all its follow-up enqueues are finished
    ///
    /// # Panics
    ///
    /// Panics if called more often than tasks were enqueued.
    pub fn mark_done(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or_else(|_| panic!("mark_done called without a matching enqueue"));

        if previous == 1 {
            self.close();
        }
    }

    /// Stop the scan: refuse new tasks, discard queued ones, wake all workers
    pub fn cancel(&self) {
        let _gate = self.gate.write();
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        while let Ok(_task) = self.receiver.try_recv() {
            self.stats.discarded.fetch_add(1, Ordering::Relaxed);
            self.mark_done();
        }

        self.close();
    }

    /// Check if the scan has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Check if all work is complete
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0
    }

    /// Enqueued-but-not-completed task count
    #[cfg(test)]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Tasks waiting to be dequeued
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if no task is waiting
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    fn close(&self) {
        self.idle_tx.lock().take();
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that calls [`TaskQueue::mark_done`] on drop
///
/// Dropping during a panic still releases the slot, so a panicking worker
/// cannot leave the scan hanging.
pub struct CompletionGuard<'a> {
    queue: &'a TaskQueue,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.queue.mark_done();
    }
}
