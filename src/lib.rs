//! dirscout - Recursive HTTP Content Discovery Scanner
//!
//! Finds unlinked resources on a web server by requesting every entry of a
//! dictionary under a target URL, and recursing into whatever turns out to
//! be a directory.
//!
//! # Features
//!
//! - **Recursive Discovery**: Each discovered directory is scanned with the
//!   full dictionary again, optionally bounded by a maximum depth.
//!
//! - **Parallel Scanning**: A pool of worker threads shares one HTTP client
//!   and one task queue. Every path is requested at most once.
//!
//! - **Request Shaping**: Custom user agent, cookies, headers, a cookie jar
//!   and SOCKS5 proxying.
//!
//! - **Pluggable Output**: Results go to logs, a progress display, an
//!   in-memory collector and an optional JSON Lines file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Target Server                             │
//! └─────────────────────────────▲───────────────────────────────────┘
//!                               │ GET (reqwest, no redirects)
//! ┌─────────────────────────────┴───────────────────────────────────┐
//! │                      Worker Threads                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker N │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┼────────────┼────────────────────┘          │
//! │                    ▼            ▼                               │
//! │            ┌──────────────────────────┐                         │
//! │            │       Task Queue         │                         │
//! │            │  - visited-path dedup    │                         │
//! │            │  - quiescence detection  │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   Result Sinks   │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Basic scan
//! dirscout scan http://localhost:8080/ -d words.txt
//!
//! # Authenticated scan with progress and a results file
//! dirscout scan https://example.com/app/ -d words.txt -t 32 \
//!     --cookie session=abc --header "Authorization: Bearer x" -p -o found.jsonl
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod http;
pub mod output;
pub mod progress;
pub mod scan;

pub use config::{CliArgs, ScanConfig};
pub use dictionary::{Dictionary, DictionarySource, Fragment};
pub use error::{Result, ScanError};
pub use scan::{ScanCoordinator, ScanHandle, ScanSummary};
