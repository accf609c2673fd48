//! Error types for report generation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("failed to parse XML {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A bundle sheet's source rule produced no result.
    #[error("sheet '{sheet}' needs rule '{rule}', which has no result")]
    MissingRule { sheet: String, rule: String },

    /// A bundle sheet points at an aggregation rule instead of a row filter.
    #[error("sheet '{sheet}' cannot be projected from aggregate rule '{rule}'")]
    UnsupportedSheet { sheet: String, rule: String },

    /// An input file the presentation layer reads does not exist.
    #[error("required artifact not found: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render chart {path}: {message}")]
    Chart { path: PathBuf, message: String },

    #[error("invalid workbook {path}: {message}")]
    InvalidWorkbook { path: PathBuf, message: String },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::InvalidWorkbook {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
