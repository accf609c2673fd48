use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;
use seo_report::{DASHBOARD_FILE, DashboardStatus, SectionToggles, write_dashboard};
use seo_rules::RuleCatalog;
use tracing::info;

use seo_cli::pipeline::{AuditOptions, AuditOutcome, load_thresholds, run_audit};

use crate::cli::{DashboardArgs, RulesArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_audit_command(args: &RunArgs) -> Result<AuditOutcome> {
    let options = AuditOptions {
        config: args.config.clone(),
        dry_run: args.dry_run,
        output_dir: args.output_dir.clone(),
        ..AuditOptions::new(&args.crawl_csv)
    };
    run_audit(&options)
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let thresholds = load_thresholds(args.config.as_deref())?;
    let catalog = RuleCatalog::standard(&thresholds).context("build rule catalog")?;
    let mut table = Table::new();
    table.set_header(vec!["Rule", "Name", "Partition", "Condition", "Artifact"]);
    apply_table_style(&mut table);
    for rule in catalog.rules() {
        table.add_row(vec![
            rule.id.clone(),
            rule.name.clone(),
            rule.partition.to_string(),
            rule.describe(),
            rule.artifact
                .as_deref()
                .map_or_else(|| "-".to_string(), seo_report::artifact_file),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_dashboard(args: &DashboardArgs) -> Result<(PathBuf, DashboardStatus)> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.reports_dir.join(DASHBOARD_FILE));
    let status = write_dashboard(&args.reports_dir, &output, &SectionToggles::default())
        .with_context(|| format!("write dashboard {}", output.display()))?;
    info!(path = %output.display(), ?status, "dashboard written");
    Ok((output, status))
}
