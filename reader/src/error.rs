use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a URL (or the whole run) from producing a row.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Connection, DNS, malformed URL or body read failure
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be configured
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    /// A response arrived but its status was not 200
    #[error("fetch of {url} failed with http status {status}")]
    Fetch { url: String, status: u16 },

    #[error("could not extract a readable article from {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("could not parse article markup: {reason}")]
    MarkupParse { reason: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Csv(#[from] csv::Error),
}

impl ReaderError {
    /// Short stable name used in logs and in the `error` column.
    pub fn kind(&self) -> &'static str {
        match self {
            ReaderError::Network { .. } => "network",
            ReaderError::Client(_) => "client",
            ReaderError::Timeout { .. } => "timeout",
            ReaderError::Fetch { .. } => "fetch",
            ReaderError::Extraction { .. } => "extraction",
            ReaderError::MarkupParse { .. } => "markup_parse",
            ReaderError::Io { .. } => "io",
            ReaderError::Csv(_) => "csv",
        }
    }

    /// HTTP status for `Fetch` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ReaderError::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReaderError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
