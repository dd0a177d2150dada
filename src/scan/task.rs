//! Scan tasks and results
//!
//! A [`ScanTask`] is one (base path, fragment) pair. Its resolved path is
//! computed once at creation and doubles as the deduplication key, so two
//! tasks that normalize to the same path are the same unit of work.

use crate::dictionary::Fragment;
use crate::error::RequestError;
use crate::http::HttpResponse;
use reqwest::Url;

/// One unit of work: request `fragment` under `base_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    /// Normalized prefix, always ending with `/`
    pub base_path: String,

    /// Dictionary entry appended to the base
    pub fragment: Fragment,

    /// Generations from the scan root (seed tasks are 0)
    pub depth: usize,

    /// Normalized absolute path requested for this task
    pub path: String,
}

impl ScanTask {
    /// Create a task, resolving its absolute path
    pub fn new(base_path: impl Into<String>, fragment: Fragment, depth: usize) -> Self {
        let base_path = as_directory(&normalize_path(&base_path.into()));
        let path = join_path(&base_path, &fragment.value);
        Self {
            base_path,
            fragment,
            depth,
            path,
        }
    }

    /// Base path for the tasks spawned if this one is expanded
    pub fn child_base(&self) -> String {
        as_directory(&self.path)
    }

    /// Full URL for this task on `target`'s origin
    pub fn url(&self, target: &Url) -> Url {
        let mut url = target.clone();
        url.set_path(&self.path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

/// Outcome of one executed task
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// The task that produced this result
    pub task: ScanTask,

    /// URL that was requested
    pub url: Url,

    /// Response, or the transport failure
    pub outcome: Result<HttpResponse, RequestError>,
}

impl ScanResult {
    /// Create a result for `task`
    pub fn new(task: ScanTask, url: Url, outcome: Result<HttpResponse, RequestError>) -> Self {
        Self { task, url, outcome }
    }

    /// HTTP status, absent on transport failure
    pub fn status(&self) -> Option<u16> {
        self.outcome.as_ref().ok().map(|r| r.status)
    }

    /// Transport failure, if any
    pub fn error(&self) -> Option<&RequestError> {
        self.outcome.as_ref().err()
    }

    /// Check for a 2xx response
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_ok_and(HttpResponse::is_success)
    }

    /// Requested path
    pub fn path(&self) -> &str {
        &self.task.path
    }
}

/// Root base path for a target URL: its path with a trailing `/`
pub fn root_base(target: &Url) -> String {
    as_directory(&normalize_path(target.path()))
}

/// Append `fragment` to `base`, then normalize
pub fn join_path(base: &str, fragment: &str) -> String {
    let fragment = fragment.trim_start_matches('/');
    normalize_path(&format!("{}{}", as_directory(base), fragment))
}

/// Normalize an absolute path
///
/// Collapses repeated separators and resolves `.` and `..` segments
/// (`..` stops at the root). A trailing separator is kept, since `/a` and
/// `/a/` are different resources.
pub fn normalize_path(path: &str) -> String {
    let trailing = path.ends_with('/')
        || path.ends_with("/.")
        || path.ends_with("/..")
        || path == "."
        || path == "..";

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if trailing {
        normalized.push('/');
    }
    normalized
}

fn as_directory(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}
