//! Error types for the storage layer.
//!
//! Every failure the stores can report is a [`StoreError`]. Variants map onto
//! the kinds a caller needs to tell apart: bad configuration, an unavailable
//! backend, unreadable or malformed documents, an inconsistent query, and the
//! combined failure of both backends.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One of the two data sources behind the aggregated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// SQLite database (current OpenCode storage)
    Relational,
    /// Flat JSON documents (legacy OpenCode storage)
    Document,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Relational => "sqlite",
            Backend::Document => "json",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required path or option is missing, or the options contradict each other.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend could not be opened or is no longer usable.
    #[error("{backend} unavailable: {reason}")]
    Unavailable { backend: Backend, reason: String },

    /// A directory could not be listed or a file could not be read.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document failed to parse. `file` is the document's file name.
    #[error("{file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Session query issued without a project id.
    #[error("empty project id")]
    EmptyProjectId,

    /// Query or row scan failure, propagated as reported by SQLite.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Both configured backends failed.
    #[error("sqlite: {relational}; json: {document}")]
    Combined {
        relational: Box<StoreError>,
        document: Box<StoreError>,
    },

    /// A blocking worker did not complete.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unavailable(backend: Backend, reason: impl fmt::Display) -> Self {
        StoreError::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the storage layer.
pub type Result<T> = std::result::Result<T, StoreError>;
