//! Newline-delimited JSON result file

use super::ResultSink;
use crate::error::OutputError;
use crate::scan::ScanResult;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One line of the output file
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    url: &'a str,
    path: &'a str,
    depth: usize,
    status: Option<u16>,
    content_length: Option<u64>,
    location: Option<&'a str>,
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl<'a> ResultRecord<'a> {
    fn from_result(result: &'a ScanResult) -> Self {
        let response = result.outcome.as_ref().ok();
        Self {
            url: result.url.as_str(),
            path: &result.task.path,
            depth: result.task.depth,
            status: response.map(|r| r.status),
            content_length: response.map(|r| r.content_length),
            location: response.and_then(|r| r.location()),
            error: result.error().map(ToString::to_string),
            timestamp: Utc::now(),
        }
    }
}

/// Writes one JSON object per result
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = File::create(path).map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Output file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered lines to disk
    pub fn flush(&self) -> Result<(), OutputError> {
        self.writer.lock().flush().map_err(|source| OutputError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl ResultSink for JsonLinesSink {
    fn record(&self, result: ScanResult) {
        let record = ResultRecord::from_result(&result);
        let mut writer = self.writer.lock();

        let written = serde_json::to_writer(&mut *writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"));

        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "Failed to write result");
        }
    }
}
