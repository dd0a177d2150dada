//! Dictionary loading
//!
//! A dictionary is an ordered list of path fragments to request. It is loaded
//! once, before any scan request is issued, from either a local file or a
//! remote `http(s)://` URL.
//!
//! Lines are trimmed, blank lines and `#` comments are skipped. A line ending
//! in `/` marks a directory-like fragment.

use crate::error::{error_chain, DictionaryError};
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Prefix marking a comment line
const COMMENT_PREFIX: char = '#';

/// One dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// The raw path fragment (without surrounding whitespace)
    pub value: String,

    /// True when the source line ended with a path separator
    pub directory_like: bool,
}

impl Fragment {
    /// Create a fragment, deriving the directory marker from a trailing `/`
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let directory_like = value.ends_with('/');
        Self {
            value,
            directory_like,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Where a dictionary comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// Local file
    File(PathBuf),

    /// Remote URL fetched once with a GET
    Remote(Url),
}

impl DictionarySource {
    /// Interpret a CLI value: `http://` and `https://` values are remote,
    /// everything else is a local path
    pub fn parse(raw: &str) -> Result<Self, DictionaryError> {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| DictionaryError::Fetch {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
            Ok(DictionarySource::Remote(url))
        } else {
            Ok(DictionarySource::File(PathBuf::from(raw)))
        }
    }
}

impl fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionarySource::File(path) => write!(f, "{}", path.display()),
            DictionarySource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Ordered list of fragments shared by every generation of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    fragments: Vec<Fragment>,
}

impl Dictionary {
    /// Build a dictionary from already-split fragments
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Parse dictionary text, one fragment per line
    pub fn parse(text: &str) -> Self {
        let fragments = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
            .map(Fragment::new)
            .collect();

        Self { fragments }
    }

    /// Load from whichever source was configured
    pub fn load(source: &DictionarySource, timeout: Duration) -> Result<Self, DictionaryError> {
        let dictionary = match source {
            DictionarySource::File(path) => Self::from_file(path)?,
            DictionarySource::Remote(url) => Self::from_url(url, timeout)?,
        };

        if dictionary.is_empty() {
            return Err(DictionaryError::Empty {
                source_name: source.to_string(),
            });
        }

        info!(
            source = %source,
            entries = dictionary.len(),
            directories = dictionary.directory_count(),
            "Dictionary loaded"
        );

        Ok(dictionary)
    }

    /// Read a dictionary from a local file
    pub fn from_file(path: &Path) -> Result<Self, DictionaryError> {
        let text = std::fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Fetch a dictionary from a remote URL
    pub fn from_url(url: &Url, timeout: Duration) -> Result<Self, DictionaryError> {
        debug!(url = %url, "Fetching remote dictionary");

        let fetch_err = |e: reqwest::Error| DictionaryError::Fetch {
            url: url.to_string(),
            reason: error_chain(&e),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(fetch_err)?;

        let response = client.get(url.clone()).send().map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DictionaryError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(fetch_err)?;
        Ok(Self::parse(&text))
    }

    /// Fragments in dictionary order
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True when the dictionary has no fragments
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of directory-like fragments
    pub fn directory_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.directory_like).count()
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}
