//! One-call writer for every file a run produces.

use std::path::{Path, PathBuf};
use std::time::Instant;

use seo_model::OutputBundle;
use seo_rules::RuleResults;
use seo_transform::PipelineRun;
use tracing::{info, info_span};

use crate::artifacts::{write_cleaned_data, write_rule_artifacts};
use crate::bundle::build_bundle;
use crate::error::Result;
use crate::stats::{SummaryStats, write_chart_data};
use crate::workbook::{WORKBOOK_FILE, write_workbook};

/// Paths written by [`write_reports`].
#[derive(Debug, Clone)]
pub struct ReportOutputs {
    pub cleaned_data: PathBuf,
    pub artifacts: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub workbook: PathBuf,
    pub bundle: OutputBundle,
    pub summary: SummaryStats,
}

impl ReportOutputs {
    pub fn file_count(&self) -> usize {
        2 + self.artifacts.len() + self.charts.len()
    }
}

/// Writes the normalized snapshot, rule artifacts, charts and the
/// workbook into `dir`. The bundle is built before anything is written, so
/// a missing rule fails the run without partial output.
pub fn write_reports(
    run: &PipelineRun,
    results: &RuleResults<'_>,
    dir: &Path,
) -> Result<ReportOutputs> {
    let bundle = build_bundle(results)?;

    let span = info_span!("report", output_dir = %dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let cleaned_data = write_cleaned_data(run, dir)?;
    let artifacts = write_rule_artifacts(results, dir)?;
    let charts = write_chart_data(run, results, dir)?;
    let workbook = dir.join(WORKBOOK_FILE);
    write_workbook(&bundle, &workbook)?;

    let outputs = ReportOutputs {
        cleaned_data,
        artifacts,
        charts,
        workbook,
        bundle,
        summary: SummaryStats::compute(run, results),
    };
    info!(
        file_count = outputs.file_count(),
        duration_ms = start.elapsed().as_millis(),
        "reports written"
    );
    Ok(outputs)
}
