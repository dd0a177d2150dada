//! HTTP request execution
//!
//! The scan engine only sees the [`RequestExecutor`] trait. The production
//! implementation, [`HttpExecutor`], wraps one shared blocking reqwest client
//! that every worker thread uses concurrently.

mod executor;

pub use executor::HttpExecutor;

use crate::error::RequestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// A static `name=value` cookie sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Read-only snapshot of the request settings for one scan run
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// SOCKS5 proxy address (`host:port`)
    pub socks5: Option<String>,

    /// Cookies sent with every request
    pub cookies: Vec<Cookie>,

    /// Headers sent with every request
    pub headers: Vec<(HeaderName, HeaderValue)>,

    /// User-Agent header
    pub user_agent: String,

    /// Persist `Set-Cookie` across requests
    pub use_cookie_jar: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            socks5: None,
            cookies: Vec::new(),
            headers: Vec::new(),
            user_agent: format!("dirscout/{}", env!("CARGO_PKG_VERSION")),
            use_cookie_jar: false,
        }
    }
}

/// Response data the engine cares about
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Body length in bytes
    pub content_length: u64,
}

impl HttpResponse {
    /// Response with a status and nothing else
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content_length: 0,
        }
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `Location` header, if any
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Performs one request per call
///
/// Implementations must be safe to call from many worker threads at once
/// and must report transport failures as `Err`, never panic.
pub trait RequestExecutor: Send + Sync {
    /// Request `url` and report its status or the transport failure
    fn execute(&self, url: &Url) -> Result<HttpResponse, RequestError>;
}
