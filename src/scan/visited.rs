//! Visited-path set shared by all workers

use parking_lot::Mutex;
use std::collections::HashSet;

/// Normalized absolute paths already enqueued or in flight
///
/// A path is admitted at most once per scan run. Check and insert happen
/// under one lock acquisition, so two workers racing on the same path can
/// never both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    paths: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `path`, returning `true` if it was not present yet
    pub fn insert(&self, path: &str) -> bool {
        let mut paths = self.paths.lock();
        if paths.contains(path) {
            return false;
        }
        paths.insert(path.to_string())
    }

    /// Number of admitted paths
    pub fn admitted(&self) -> usize {
        self.paths.lock().len()
    }
}
