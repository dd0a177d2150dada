//! tracing-backed result reporting

use super::ResultSink;
use crate::scan::ScanResult;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Logs every result: findings at info, ignored statuses at debug,
/// transport failures at warn
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    ignored: BTreeSet<u16>,
}

impl LogSink {
    /// Create a sink that demotes `ignored` statuses to debug
    pub fn new(ignored: BTreeSet<u16>) -> Self {
        Self { ignored }
    }
}

impl ResultSink for LogSink {
    fn record(&self, result: ScanResult) {
        match &result.outcome {
            Ok(response) if self.ignored.contains(&response.status) => {
                debug!(
                    url = %result.url,
                    status = response.status,
                    depth = result.task.depth,
                    "Ignored"
                );
            }
            Ok(response) => match response.location() {
                Some(location) => info!(
                    url = %result.url,
                    status = response.status,
                    location = %location,
                    "Found"
                ),
                None => info!(
                    url = %result.url,
                    status = response.status,
                    length = response.content_length,
                    "Found"
                ),
            },
            Err(error) => {
                warn!(
                    url = %result.url,
                    timeout = error.is_timeout(),
                    error = %error,
                    "failed to perform request"
                );
            }
        }
    }
}
