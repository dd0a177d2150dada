//! Configuration types for dirscout
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Cookie and header argument parsing
//!
//! Everything here runs before the first request is issued; any malformed
//! input fails the run with a [`ConfigError`] naming the offending value.

use crate::dictionary::DictionarySource;
use crate::error::ConfigError;
use crate::http::{Cookie, HttpConfig};
use crate::scan::{RecursionPolicy, ScanOptions};
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

/// Maximum reasonable thread count
const MAX_THREADS: usize = 512;

/// Default request timeout in milliseconds
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default recursion depth
///
/// Catch-all servers answer 2xx for any path, so an unbounded scan of a
/// directory-like entry would never terminate.
pub const DEFAULT_SCAN_DEPTH: usize = 3;

/// Matches `name=value` cookie arguments
static COOKIE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^=;,\s]+)=([^;,]*)$").expect("Invalid cookie regex")
});

/// Matches `Name: value` header arguments
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([!#$%&'*+\-.^_`|~0-9A-Za-z]+)\s*:\s*(.*)$").expect("Invalid header regex")
});

/// Recursive HTTP content discovery scanner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dirscout",
    version,
    about = "Recursive HTTP content discovery scanner",
    long_about = "Discovers reachable resources on an HTTP server by requesting every\n\
                  dictionary entry under the target, and recursing into every\n\
                  directory-like entry that answers with a success status.",
    after_help = "EXAMPLES:\n    \
        dirscout scan http://localhost:8080 -d words.txt\n    \
        dirscout scan https://example.com/app/ -d https://example.com/words.txt -t 16\n    \
        dirscout scan http://10.0.0.5 -d words.txt --cookie session=abc --header 'Authorization: Bearer 123'\n    \
        dirscout scan http://10.0.0.5 -d words.txt --socks5 127.0.0.1:9050 --use-cookie-jar -o results.jsonl"
)]
pub struct CliArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (show every request outcome)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only warnings and errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a target with a dictionary, recursing into discovered directories
    Scan(ScanArgs),
}

/// Arguments of the `scan` subcommand
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Base URL to scan (http:// or https://)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Dictionary file path or http(s) URL
    #[arg(short = 'd', long, env = "DIRSCOUT_DICTIONARY", value_name = "PATH|URL")]
    pub dictionary: String,

    /// Number of concurrent workers
    #[arg(short = 't', long, default_value_t = default_threads(), value_name = "NUM")]
    pub threads: usize,

    /// Request timeout in milliseconds
    #[arg(long = "http-timeout", default_value_t = DEFAULT_TIMEOUT_MS, value_name = "MS")]
    pub http_timeout: u64,

    /// SOCKS5 proxy to route every request through
    #[arg(long, value_name = "HOST:PORT")]
    pub socks5: Option<String>,

    /// Cookie to send with every request (can be repeated)
    #[arg(long = "cookie", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub cookies: Vec<String>,

    /// Header to send with every request (can be repeated)
    #[arg(long = "header", value_name = "NAME: VALUE", action = clap::ArgAction::Append)]
    pub headers: Vec<String>,

    /// User agent for every request
    #[arg(long, env = "DIRSCOUT_USER_AGENT", default_value_t = default_user_agent())]
    pub user_agent: String,

    /// Keep cookies set by the server and send them on later requests
    #[arg(long)]
    pub use_cookie_jar: bool,

    /// Which successful results are expanded into a new generation
    #[arg(long, value_enum, default_value_t = RecursionPolicy::default())]
    pub recursion: RecursionPolicy,

    /// Maximum recursion depth
    #[arg(long = "scan-depth", default_value_t = DEFAULT_SCAN_DEPTH, value_name = "NUM")]
    pub max_depth: usize,

    /// Recurse without a depth limit (may not terminate on catch-all servers)
    #[arg(long, conflicts_with = "max_depth")]
    pub unlimited_depth: bool,

    /// Statuses that are not reported as findings
    #[arg(
        long = "http-statuses-to-ignore",
        value_delimiter = ',',
        default_value = "404",
        value_name = "CODES"
    )]
    pub ignore_statuses: Vec<u16>,

    /// Write every result as a JSON line to this file
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show a live progress spinner
    #[arg(short = 'p', long)]
    pub progress: bool,
}

fn default_threads() -> usize {
    // Requests are I/O bound
    num_cpus::get() * 2
}

fn default_user_agent() -> String {
    format!("dirscout/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a `name=value` cookie argument
pub fn parse_cookie(raw: &str) -> Result<Cookie, ConfigError> {
    let trimmed = strip_quotes(raw.trim());
    let caps = COOKIE_REGEX
        .captures(trimmed)
        .ok_or_else(|| ConfigError::InvalidCookie {
            raw: raw.to_string(),
        })?;

    Ok(Cookie {
        name: caps[1].to_string(),
        value: caps[2].trim().to_string(),
    })
}

/// Parse a `Name: value` header argument
///
/// Surrounding double quotes are tolerated, since shells and wrappers
/// sometimes pass them through.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let invalid = || ConfigError::InvalidHeader {
        raw: raw.to_string(),
    };

    let trimmed = strip_quotes(raw.trim());
    let caps = HEADER_REGEX.captures(trimmed).ok_or_else(invalid)?;

    let name = HeaderName::from_bytes(caps[1].as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(caps[2].trim()).map_err(|_| invalid())?;

    Ok((name, value))
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Parse and check the scan target
pub fn parse_target(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidTarget {
        target: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    }

    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }

    Ok(url)
}

/// Check a `host:port` SOCKS5 address
fn parse_socks5(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidProxy {
        address: raw.to_string(),
        reason: reason.to_string(),
    };

    let address = raw.trim();
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected HOST:PORT"))?;

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    port.parse::<u16>().map_err(|_| invalid("invalid port"))?;

    Ok(address.to_string())
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Base URL of the scan
    pub target: Url,

    /// Dictionary location
    pub dictionary: DictionarySource,

    /// Number of worker threads
    pub worker_count: usize,

    /// HTTP client settings shared by every request
    pub http: HttpConfig,

    /// Recursion trigger
    pub recursion: RecursionPolicy,

    /// Maximum recursion depth (`None` when explicitly unlimited)
    pub max_depth: Option<usize>,

    /// Statuses left out of findings
    pub ignore_statuses: BTreeSet<u16>,

    /// JSON lines output file
    pub output_path: Option<PathBuf>,

    /// Show progress spinner
    pub show_progress: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: ScanArgs) -> Result<Self, ConfigError> {
        let target = parse_target(&args.target)?;

        if args.threads == 0 || args.threads > MAX_THREADS {
            return Err(ConfigError::InvalidThreadCount {
                count: args.threads,
                max: MAX_THREADS,
            });
        }

        if args.http_timeout == 0 {
            return Err(ConfigError::InvalidTimeout {
                millis: args.http_timeout,
            });
        }

        let cookies = args
            .cookies
            .iter()
            .map(|c| parse_cookie(c))
            .collect::<Result<Vec<_>, _>>()?;

        let headers = args
            .headers
            .iter()
            .map(|h| parse_header(h))
            .collect::<Result<Vec<_>, _>>()?;

        let socks5 = args.socks5.as_deref().map(parse_socks5).transpose()?;

        let ignore_statuses = args
            .ignore_statuses
            .iter()
            .map(|&status| {
                if (100..=599).contains(&status) {
                    Ok(status)
                } else {
                    Err(ConfigError::InvalidStatus { status })
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        if let Some(output) = &args.output {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::InvalidOutputPath {
                        path: output.clone(),
                        reason: format!("Parent directory '{}' does not exist", parent.display()),
                    });
                }
            }
        }

        let dictionary = DictionarySource::parse(&args.dictionary).map_err(|e| {
            ConfigError::InvalidDictionary {
                source_name: args.dictionary.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            target,
            dictionary,
            worker_count: args.threads,
            http: HttpConfig {
                timeout: Duration::from_millis(args.http_timeout),
                socks5,
                cookies,
                headers,
                user_agent: args.user_agent,
                use_cookie_jar: args.use_cookie_jar,
            },
            recursion: args.recursion,
            max_depth: (!args.unlimited_depth).then_some(args.max_depth),
            ignore_statuses,
            output_path: args.output,
            show_progress: args.progress,
        })
    }

    /// Log the active configuration before scanning
    pub fn log_summary(&self) {
        let cookies: Vec<String> = self.http.cookies.iter().map(ToString::to_string).collect();
        let headers: Vec<String> = self
            .http
            .headers
            .iter()
            .map(|(name, value)| {
                format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
            })
            .collect();

        info!(
            url = %self.target,
            dictionary = %self.dictionary,
            threads = self.worker_count,
            user_agent = %self.http.user_agent,
            cookies = ?cookies,
            headers = ?headers,
            socks5 = self.http.socks5.as_deref().unwrap_or("none"),
            cookie_jar = self.http.use_cookie_jar,
            recursion = self.recursion.as_str(),
            max_depth = ?self.max_depth,
            "Starting scan with configuration"
        );
    }

    /// Engine options derived from this configuration
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            target: self.target.clone(),
            worker_count: self.worker_count,
            recursion: self.recursion,
            max_depth: self.max_depth,
        }
    }
}
