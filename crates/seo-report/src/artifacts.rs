//! Standalone CSV artifacts: one file per rule plus the normalized snapshot.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{
    Column as FrameColumn, CsvWriter, DataFrame, IntoColumn, NamedFrom, SerWriter, Series,
};
use seo_model::{Column, Table, Value};
use seo_rules::RuleResults;
use seo_transform::PipelineRun;
use tracing::{debug, info};

use crate::error::{ReportError, Result};

pub const CLEANED_DATA_FILE: &str = "cleaned_data.csv";

/// File name of a rule artifact stem.
pub fn artifact_file(stem: &str) -> String {
    format!("{stem}.csv")
}

/// Writes every rule that declares an artifact. Returns the written paths in
/// catalog order.
pub fn write_rule_artifacts(results: &RuleResults<'_>, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ReportError::io(dir, source))?;
    let mut written = Vec::new();
    for result in results.iter() {
        let Some(stem) = result.spec.artifact.as_deref() else {
            continue;
        };
        let path = dir.join(artifact_file(stem));
        write_table_csv(&result.to_table(), &path)?;
        debug!(rule = result.id(), row_count = result.len(), path = %path.display(), "artifact written");
        written.push(path);
    }
    info!(artifact_count = written.len(), "rule artifacts written");
    Ok(written)
}

/// Persists the normalized relation with every contract column.
pub fn write_cleaned_data(run: &PipelineRun, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| ReportError::io(dir, source))?;
    let columns = Column::ALL;
    let mut table = Table::new(columns.iter().map(|c| c.header().to_string()).collect());
    for page in run.pages() {
        table.push_row(page.project(&columns));
    }
    let path = dir.join(CLEANED_DATA_FILE);
    write_table_csv(&table, &path)?;
    info!(row_count = table.len(), path = %path.display(), "normalized crawl written");
    Ok(path)
}

/// Writes a table through polars. Columns holding only numbers become
/// numeric series (integers when every value is integral); anything else
/// is written as text.
pub fn write_table_csv(table: &Table, path: &Path) -> Result<()> {
    let mut df = table_to_frame(table).map_err(|source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = File::create(path).map_err(|source| ReportError::io(path, source))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

pub fn table_to_frame(table: &Table) -> polars::prelude::PolarsResult<DataFrame> {
    let columns: Vec<FrameColumn> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = table.rows.iter().map(|row| row.get(idx).unwrap_or(&Value::Missing));
            series_for(name, cells).into_column()
        })
        .collect();
    DataFrame::new(columns)
}

fn series_for<'a>(name: &str, cells: impl Iterator<Item = &'a Value> + Clone) -> Series {
    let numeric = cells
        .clone()
        .all(|value| matches!(value, Value::Number(_) | Value::Missing));
    if numeric {
        let numbers: Vec<Option<f64>> = cells.map(Value::as_number).collect();
        if numbers.iter().flatten().all(|n| is_integral(*n)) {
            let ints: Vec<Option<i64>> = numbers.iter().map(|n| n.map(|v| v as i64)).collect();
            return Series::new(name.into(), ints);
        }
        return Series::new(name.into(), numbers);
    }
    let texts: Vec<Option<String>> = cells
        .map(|value| (!value.is_missing()).then(|| value.to_string()))
        .collect();
    Series::new(name.into(), texts)
}

fn is_integral(value: f64) -> bool {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    value.fract() == 0.0 && value.abs() <= MAX_EXACT
}
