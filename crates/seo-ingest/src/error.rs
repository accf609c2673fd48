//! Error types for crawl export ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a crawl export.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The export file does not exist.
    #[error("crawl export not found: {path}")]
    MissingSource { path: PathBuf },

    /// The export has no header row.
    #[error("crawl export is empty: {path}")]
    EmptySource { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two headers normalize to the same identifier.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { column: String, path: PathBuf },

    /// Required contract columns are absent.
    #[error("missing required columns in {path}: {}", missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },
}

pub type Result<T> = std::result::Result<T, IngestError>;
