//! Result sinks
//!
//! Every completed task is handed to a [`ResultSink`] exactly once. Workers
//! call [`ResultSink::record`] concurrently; sinks own whatever
//! synchronization they need.

mod collector;
mod jsonl;
mod log;

pub use collector::ResultCollector;
pub use jsonl::JsonLinesSink;
pub use log::LogSink;

use crate::scan::ScanResult;
use std::sync::Arc;

/// Receives every completed scan result
pub trait ResultSink: Send + Sync {
    /// Consume one result
    fn record(&self, result: ScanResult);
}

impl<S: ResultSink + ?Sized> ResultSink for Arc<S> {
    fn record(&self, result: ScanResult) {
        (**self).record(result)
    }
}

/// Fans each result out to several sinks
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl MultiSink {
    /// Create an empty fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add a sink in place
    pub fn push(&mut self, sink: Arc<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if there are no sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for MultiSink {
    fn record(&self, result: ScanResult) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(result.clone());
            }
            last.record(result);
        }
    }
}
