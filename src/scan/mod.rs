//! Recursive scan engine
//!
//! Every dictionary entry is requested under the target's path. Responses that
//! look like directories open a new generation: the whole dictionary again,
//! under the discovered path. Paths are deduplicated when scheduled, so each
//! normalized path is requested at most once per scan.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │     ScanCoordinator     │
//!                     │  - seeds generation 0   │
//!                     │  - joins workers        │
//!                     └───────────┬─────────────┘
//!                                 │
//!                     ┌───────────▼─────────────┐
//!                     │       TaskQueue         │◄──── VisitedSet
//!                     │  (crossbeam unbounded)  │      (dedup on enqueue)
//!                     └───────────┬─────────────┘
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  GET      │             │  GET      │             │  GET      │
//! │  classify │             │  classify │             │  classify │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └─────────────────────────┼─────────────────────────┘
//!                                 ▼
//!                          ResultSink(s)
//! ```

pub mod classifier;
pub mod coordinator;
pub mod queue;
pub mod task;
pub mod visited;
pub mod worker;

pub use classifier::RecursionPolicy;
pub use coordinator::{ScanCoordinator, ScanHandle, ScanOptions, ScanSummary};
pub use queue::TaskQueue;
pub use task::{ScanResult, ScanTask};
pub use visited::VisitedSet;
