//! In-memory result collection

use super::ResultSink;
use crate::scan::ScanResult;
use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Keeps every result of a run for the final summary
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Mutex<Vec<ScanResult>>,
}

impl ResultCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all results in arrival order
    pub fn results(&self) -> Vec<ScanResult> {
        self.results.lock().clone()
    }

    /// Requested paths in arrival order
    pub fn paths(&self) -> Vec<String> {
        self.results
            .lock()
            .iter()
            .map(|r| r.task.path.clone())
            .collect()
    }

    /// Answered requests whose status is not ignored, sorted by path
    pub fn found(&self, ignored: &BTreeSet<u16>) -> Vec<ScanResult> {
        let mut found: Vec<ScanResult> = self
            .results
            .lock()
            .iter()
            .filter(|r| r.status().is_some_and(|s| !ignored.contains(&s)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.task.path.cmp(&b.task.path));
        found
    }

    /// Results that failed at the transport level
    pub fn failures(&self) -> Vec<ScanResult> {
        self.results
            .lock()
            .iter()
            .filter(|r| r.error().is_some())
            .cloned()
            .collect()
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl ResultSink for ResultCollector {
    fn record(&self, result: ScanResult) {
        self.results.lock().push(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Fragment;
    use crate::error::RequestError;
    use crate::http::HttpResponse;
    use crate::scan::ScanTask;
    use reqwest::Url;

    fn record(collector: &ResultCollector, fragment: &str, outcome: Result<u16, ()>) {
        let task = ScanTask::new("/", Fragment::new(fragment), 0);
        let url = task.url(&Url::parse("http://localhost/").unwrap());
        let outcome = outcome.map(HttpResponse::with_status).map_err(|_| RequestError::Timeout {
            url: url.to_string(),
            reason: "deadline".into(),
        });
        collector.record(ScanResult::new(task, url, outcome));
    }

    #[test]
    fn test_found_filters_and_sorts() {
        let collector = ResultCollector::new();
        record(&collector, "zeta", Ok(200));
        record(&collector, "home", Ok(404));
        record(&collector, "admin/", Ok(403));
        record(&collector, "slow", Err(()));

        let ignored = BTreeSet::from([404]);
        let found: Vec<String> = collector
            .found(&ignored)
            .into_iter()
            .map(|r| r.task.path)
            .collect();
        assert_eq!(found, vec!["/admin/", "/zeta"]);

        assert_eq!(collector.failures().len(), 1);
        assert_eq!(collector.len(), 4);
    }
}
