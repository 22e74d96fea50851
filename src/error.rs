// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Everything that can stop a job.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection, DNS, timeout or body read failure.
    #[error("error loading page {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a success status.
    #[error("HTTP {status} loading page {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A required element is missing from the page skeleton.
    #[error("tag not found: {query}")]
    TagNotFound { query: String },

    /// The page has the expected shape but none of the candidates carry the content.
    #[error("nothing to parse: {what}")]
    NothingToParse { what: String },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot load config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("row has {got} cells, header has {expected}")]
    RowWidth { expected: usize, got: usize },
}

impl ScrapeError {
    /// Failures a per-item loop may absorb and carry on past.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
