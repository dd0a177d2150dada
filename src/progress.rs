//! Progress reporting for the scanner
//!
//! Provides a live spinner using indicatif, plus the header and summary
//! printed around a scan.

use crate::output::ResultSink;
use crate::scan::{ScanResult, ScanSummary};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Spinner that counts results as they arrive
///
/// Only findings (answered requests with a non-ignored status) are kept for
/// the final summary; everything else is counted and dropped.
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,

    /// Statuses that do not count as findings
    ignored: BTreeSet<u16>,

    /// Results seen
    requests: AtomicU64,

    /// Results with a non-ignored status
    found: AtomicU64,

    /// Transport failures
    errors: AtomicU64,

    /// Results with a non-ignored status
    findings: Mutex<Vec<ScanResult>>,

    /// Creation time, for the request rate
    started: Instant,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(ignored: BTreeSet<u16>) -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            ignored,
            requests: AtomicU64::new(0),
            found: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            findings: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Findings sorted by path
    pub fn findings(&self) -> Vec<ScanResult> {
        let mut findings = self.findings.lock().clone();
        findings.sort_by(|a, b| a.task.path.cmp(&b.task.path));
        findings
    }

    fn refresh(&self) {
        let requests = self.requests.load(Ordering::Relaxed);
        let secs = self.started.elapsed().as_secs_f64();
        let rate = if secs > 0.0 { requests as f64 / secs } else { 0.0 };

        self.bar.set_message(format!(
            "Requests: {} | Found: {} | Errors: {} | Rate: {:.0}/s",
            format_number(requests),
            format_number(self.found.load(Ordering::Relaxed)),
            format_number(self.errors.load(Ordering::Relaxed)),
            rate,
        ));
    }
}

impl ResultSink for ProgressReporter {
    fn record(&self, result: ScanResult) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match result.status() {
            Some(status) if !self.ignored.contains(&status) => {
                self.found.fetch_add(1, Ordering::Relaxed);
                self.findings.lock().push(result);
            }
            Some(_) => {}
            None => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.refresh();
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the scan
pub fn print_header(target: &str, workers: usize, dictionary: &str, fragments: usize) {
    println!();
    println!(
        "{} {}",
        style("dirscout").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Target:").bold(), target);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!(
        "  {} {} ({} entries)",
        style("Dictionary:").bold(),
        dictionary,
        format_number(fragments as u64)
    );
    println!();
}

/// Print a summary of the scan and its findings
pub fn print_summary(summary: &ScanSummary, found: &[ScanResult]) {
    let duration_secs = summary.duration.as_secs_f64();

    println!();
    if summary.completed {
        println!("{}", style("Scan Complete").green().bold());
    } else {
        println!("{}", style("Scan Interrupted").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Requests:").bold(),
        format_number(summary.requests)
    );
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(summary.directories)
    );
    println!(
        "  {} {:.1}s ({:.0} requests/sec)",
        style("Duration:").bold(),
        duration_secs,
        summary.requests_per_second()
    );
    if summary.failures > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(summary.failures)
        );
    }

    if !found.is_empty() {
        println!();
        println!("{}", style("Found").green().bold());
        for result in found {
            if let Some(status) = result.status() {
                println!("  {} {}", style(status).cyan(), result.url);
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Fragment;
    use crate::error::RequestError;
    use crate::http::HttpResponse;
    use crate::scan::ScanTask;
    use reqwest::Url;

    fn result(fragment: &str, outcome: Result<u16, ()>) -> ScanResult {
        let task = ScanTask::new("/", Fragment::new(fragment), 0);
        let url = task.url(&Url::parse("http://localhost/").unwrap());
        let outcome = outcome.map(HttpResponse::with_status).map_err(|_| RequestError::Connect {
            url: url.to_string(),
            reason: "connection refused".into(),
        });
        ScanResult::new(task, url, outcome)
    }

    #[test]
    fn test_reporter_keeps_only_findings() {
        let reporter = ProgressReporter::new([404].into_iter().collect());

        reporter.record(result("test/", Ok(200)));
        reporter.record(result("home", Ok(404)));
        reporter.record(result("blabla", Ok(404)));
        reporter.record(result("admin", Ok(403)));
        reporter.record(result("down", Err(())));
        reporter.finish("done");

        assert_eq!(reporter.requests.load(Ordering::Relaxed), 5);
        assert_eq!(reporter.found.load(Ordering::Relaxed), 2);
        assert_eq!(reporter.errors.load(Ordering::Relaxed), 1);

        let paths: Vec<String> = reporter
            .findings()
            .iter()
            .map(|r| r.task.path.clone())
            .collect();
        assert_eq!(paths, vec!["/admin", "/test/"]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
