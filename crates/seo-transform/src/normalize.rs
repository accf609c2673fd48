//! Raw export → typed, deduplicated, partitioned crawl.

use std::collections::BTreeMap;
use std::time::Instant;

use seo_ingest::CrawlExport;
use seo_model::{Column, ColumnKind, PageRecord, Partition, Value};
use tracing::{debug, info, info_span, warn};

use crate::dedupe::dedupe_by_address;
use crate::normalization::datetime::parse_timestamp;
use crate::normalization::numeric::parse_number;

/// Content-type substring that places a row in the HTML partition.
pub const DEFAULT_HTML_MARKER: &str = "text/html";

/// Columns filled with zero when missing.
const ZERO_DEFAULT_COLUMNS: [Column; 2] = [Column::TitleLength, Column::MetaDescriptionLength];

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Case-sensitive content-type marker for the HTML partition.
    pub html_marker: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            html_marker: DEFAULT_HTML_MARKER.to_string(),
        }
    }
}

/// Bookkeeping of everything the normalizer changed or dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub input_rows: usize,
    /// Rows without an address, which cannot be keyed.
    pub keyless_rows: usize,
    pub duplicate_rows: usize,
    /// Non-empty cells that failed coercion and were stored as missing.
    pub coerced_to_missing: BTreeMap<Column, usize>,
    /// Missing cells replaced by a default.
    pub defaulted: BTreeMap<Column, usize>,
}

impl NormalizationStats {
    pub fn coerced_total(&self) -> usize {
        self.coerced_to_missing.values().sum()
    }
}

/// The normalized relation and its HTML partition.
///
/// The relation is read-only once built so the partition indices can never
/// go stale.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCrawl {
    pages: Vec<PageRecord>,
    /// Indices into `pages` of rows carrying the HTML marker.
    html: Vec<usize>,
    pub stats: NormalizationStats,
}

impl NormalizedCrawl {
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn rows(&self, partition: Partition) -> Vec<&PageRecord> {
        match partition {
            Partition::All => self.pages.iter().collect(),
            Partition::Html => self.html.iter().map(|idx| &self.pages[*idx]).collect(),
        }
    }

    pub fn partition_len(&self, partition: Partition) -> usize {
        match partition {
            Partition::All => self.pages.len(),
            Partition::Html => self.html.len(),
        }
    }
}

/// Normalizes a loaded export.
pub fn normalize_export(export: &CrawlExport, options: &NormalizeOptions) -> NormalizedCrawl {
    let span = info_span!("normalize", source = %export.source.display());
    let _guard = span.enter();
    let start = Instant::now();

    let table = &export.table;
    let mut stats = NormalizationStats {
        input_rows: table.row_count(),
        ..NormalizationStats::default()
    };
    let mut records = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut record = PageRecord::default();
        for column in Column::ALL {
            let raw = export
                .schema
                .position(column)
                .and_then(|col| table.cell(row, col));
            let value = coerce_cell(column, raw);
            if raw.is_some() && value.is_missing() {
                *stats.coerced_to_missing.entry(column).or_insert(0) += 1;
            }
            record.set(column, &value);
        }
        records.push(record);
    }
    for (column, count) in &stats.coerced_to_missing {
        debug!(column = %column, count, "malformed values coerced to missing");
    }

    let crawl = finish(records, stats, options);
    info!(
        row_count = crawl.pages().len(),
        html_rows = crawl.partition_len(Partition::Html),
        duplicate_rows = crawl.stats.duplicate_rows,
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );
    crawl
}

/// Normalizes already-typed records: defaults, dedup and partitioning.
///
/// Used when records are built in memory rather than read from an export.
pub fn normalize_records(records: Vec<PageRecord>, options: &NormalizeOptions) -> NormalizedCrawl {
    let stats = NormalizationStats {
        input_rows: records.len(),
        ..NormalizationStats::default()
    };
    finish(records, stats, options)
}

fn finish(
    mut records: Vec<PageRecord>,
    mut stats: NormalizationStats,
    options: &NormalizeOptions,
) -> NormalizedCrawl {
    let before = records.len();
    records.retain(|record| !record.address.is_empty());
    stats.keyless_rows += before - records.len();
    if stats.keyless_rows > 0 {
        warn!(keyless_rows = stats.keyless_rows, "dropped rows without an address");
    }
    stats.duplicate_rows += dedupe_by_address(&mut records);
    for record in &mut records {
        for column in ZERO_DEFAULT_COLUMNS {
            if record.value(column).is_missing() {
                record.set(column, &Value::Number(0.0));
                *stats.defaulted.entry(column).or_insert(0) += 1;
            }
        }
    }
    let html = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_html(&options.html_marker))
        .map(|(idx, _)| idx)
        .collect();
    NormalizedCrawl {
        pages: records,
        html,
        stats,
    }
}

fn coerce_cell(column: Column, raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Missing;
    };
    match column.kind() {
        ColumnKind::Text => Value::Text(raw.to_string()),
        ColumnKind::Numeric => parse_number(raw).into(),
        ColumnKind::Timestamp => parse_timestamp(raw).into(),
    }
}
