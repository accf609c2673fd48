use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::ReaderBuilder;
use tracing::{debug, info, info_span};

use crate::error::{IngestError, Result};
use crate::missing::is_missing_token;
use crate::schema::{CrawlSchema, validate_schema};

/// Crawl export as read from disk: normalized headers and trimmed cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Cell at `row`/`col`, `None` when out of range or a missing token.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        let value = self.rows.get(row)?.get(col)?;
        if is_missing_token(value) {
            None
        } else {
            Some(value.as_str())
        }
    }
}

/// A loaded export together with its validated column layout.
#[derive(Debug, Clone)]
pub struct CrawlExport {
    pub source: PathBuf,
    pub table: RawTable,
    pub schema: CrawlSchema,
}

/// Lower-cases a header, strips a byte-order mark and surrounding whitespace,
/// and collapses internal runs of whitespace to one space.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_matches('\u{feff}').trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for (idx, part) in trimmed.split_whitespace().enumerate() {
        if idx > 0 {
            normalized.push(' ');
        }
        normalized.push_str(part);
    }
    normalized.to_lowercase()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').trim().to_string()
}

/// Reads a CSV file into a [`RawTable`] without checking the column contract.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(IngestError::MissingSource {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|field| normalize_header(&String::from_utf8_lossy(field)))
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record
                .get(idx)
                .map(|field| normalize_cell(&String::from_utf8_lossy(field)))
                .unwrap_or_default();
            row.push(value);
        }
        if row.iter().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

/// Loads a crawl export and validates it against the column contract.
///
/// # Errors
///
/// Returns [`IngestError::MissingSource`] when the file does not exist and
/// [`IngestError::Schema`] when a required column is absent.
pub fn load_crawl_export(path: &Path) -> Result<CrawlExport> {
    let span = info_span!("ingest", source = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let table = read_raw_table(path)?;
    let schema = validate_schema(&table, path)?;
    debug!(
        extra_columns = table.column_count().saturating_sub(schema.len()),
        "column contract satisfied"
    );
    info!(
        row_count = table.row_count(),
        column_count = table.column_count(),
        duration_ms = start.elapsed().as_millis(),
        "crawl export loaded"
    );
    Ok(CrawlExport {
        source: path.to_path_buf(),
        table,
        schema,
    })
}
