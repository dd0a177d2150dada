//! Directory classification
//!
//! Decides whether a completed request opens a new generation of tasks.
//! Two policies are supported:
//!
//! | Policy           | 2xx + `dir/` | 2xx + `file` | non-2xx / failure |
//! |------------------|--------------|--------------|-------------------|
//! | `DirectoryLike`  | recurse      | terminal     | terminal          |
//! | `AnySuccess`     | recurse      | recurse      | terminal          |

use crate::scan::task::ScanResult;

/// Which results are expanded into child tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RecursionPolicy {
    /// Recurse only into successful fragments ending in `/`
    #[default]
    DirectoryLike,

    /// Recurse into every successful fragment
    AnySuccess,
}

impl RecursionPolicy {
    /// Decide whether `result` should be expanded
    pub fn should_recurse(self, result: &ScanResult) -> bool {
        if !result.is_success() {
            return false;
        }

        match self {
            RecursionPolicy::DirectoryLike => result.task.fragment.directory_like,
            RecursionPolicy::AnySuccess => true,
        }
    }

    /// Short name for logs
    pub fn as_str(self) -> &'static str {
        match self {
            RecursionPolicy::DirectoryLike => "directory-like",
            RecursionPolicy::AnySuccess => "any-success",
        }
    }
}
