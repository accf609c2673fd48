use std::collections::BTreeMap;
use std::path::Path;

use seo_model::Column;

use crate::csv_table::RawTable;
use crate::error::{IngestError, Result};

/// Position of every contract column present in an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSchema {
    positions: BTreeMap<Column, usize>,
}

impl CrawlSchema {
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn contains(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Maps normalized headers onto the column contract.
///
/// Unknown headers are ignored; optional columns may be absent.
pub fn validate_schema(table: &RawTable, path: &Path) -> Result<CrawlSchema> {
    let mut positions = BTreeMap::new();
    for (idx, header) in table.headers.iter().enumerate() {
        if !header.is_empty() && table.headers[..idx].contains(header) {
            return Err(IngestError::DuplicateColumn {
                column: header.clone(),
                path: path.to_path_buf(),
            });
        }
        if let Some(column) = Column::from_header(header) {
            positions.insert(column, idx);
        }
    }
    let missing: Vec<String> = Column::required()
        .filter(|column| !positions.contains_key(column))
        .map(|column| column.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::Schema {
            path: path.to_path_buf(),
            missing,
        });
    }
    Ok(CrawlSchema { positions })
}
