//! End-to-end audit run: load, normalize, evaluate, write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use seo_ingest::load_crawl_export;
use seo_report::{
    DASHBOARD_FILE, DashboardStatus, SectionToggles, SummaryStats, build_bundle, write_dashboard,
    write_reports,
};
use seo_rules::{AuditConfig, RuleCatalog, RuleEngine, Thresholds};
use seo_transform::{NormalizationStats, NormalizeOptions, PipelineRun, normalize_export};
use tracing::{info, info_span};

pub const DEFAULT_OUTPUT_DIR: &str = "reports";

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub crawl_csv: PathBuf,
    pub output_dir: PathBuf,
    pub config: Option<PathBuf>,
    /// Evaluate and summarize without writing any file.
    pub dry_run: bool,
    /// Reference time for age-based rules; now (UTC) when unset.
    pub run_at: Option<NaiveDateTime>,
}

impl AuditOptions {
    pub fn new(crawl_csv: impl Into<PathBuf>) -> Self {
        Self {
            crawl_csv: crawl_csv.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config: None,
            dry_run: false,
            run_at: None,
        }
    }
}

/// Files written by a non-dry run.
#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub workbook: PathBuf,
    pub dashboard: PathBuf,
    pub dashboard_status: DashboardStatus,
    pub file_count: usize,
}

#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub run_at: NaiveDateTime,
    pub summary: SummaryStats,
    pub normalization: NormalizationStats,
    /// `None` for dry runs.
    pub written: Option<WrittenReports>,
}

/// Thresholds from `config`, or the defaults when no file is given.
pub fn load_thresholds(config: Option<&Path>) -> Result<Thresholds> {
    match config {
        Some(path) => {
            let config = AuditConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?;
            info!(path = %path.display(), "config loaded");
            Ok(config.thresholds)
        }
        None => Ok(Thresholds::default()),
    }
}

pub fn run_audit(options: &AuditOptions) -> Result<AuditOutcome> {
    let span = info_span!("audit", source = %options.crawl_csv.display());
    let _guard = span.enter();
    let start = Instant::now();

    let thresholds = load_thresholds(options.config.as_deref())?;
    let catalog = RuleCatalog::standard(&thresholds).context("build rule catalog")?;

    let export = load_crawl_export(&options.crawl_csv)
        .with_context(|| format!("load crawl export {}", options.crawl_csv.display()))?;
    let normalize_options = NormalizeOptions {
        html_marker: thresholds.html_marker.clone(),
    };
    let crawl = normalize_export(&export, &normalize_options);
    let run_at = options.run_at.unwrap_or_else(|| Utc::now().naive_utc());
    let run = PipelineRun::new(crawl, run_at).with_source(&options.crawl_csv);

    let engine = RuleEngine::new(catalog);
    let results = engine.execute(&run);
    let summary = SummaryStats::compute(&run, &results);

    let written = if options.dry_run {
        build_bundle(&results).context("assemble report bundle")?;
        info!("dry run, no files written");
        None
    } else {
        let outputs = write_reports(&run, &results, &options.output_dir)
            .with_context(|| format!("write reports to {}", options.output_dir.display()))?;
        let dashboard = options.output_dir.join(DASHBOARD_FILE);
        let dashboard_status =
            write_dashboard(&options.output_dir, &dashboard, &SectionToggles::default())
                .context("render dashboard")?;
        Some(WrittenReports {
            workbook: outputs.workbook.clone(),
            dashboard,
            dashboard_status,
            file_count: outputs.file_count() + 1,
        })
    };

    info!(
        row_count = summary.total_urls,
        duration_ms = start.elapsed().as_millis(),
        "audit complete"
    );
    Ok(AuditOutcome {
        source: options.crawl_csv.clone(),
        output_dir: options.output_dir.clone(),
        run_at,
        summary,
        normalization: run.stats().clone(),
        written,
    })
}
