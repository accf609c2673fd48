//! CLI argument definitions for the crawl audit.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "seo-audit",
    version,
    about = "SEO crawl audit - classify crawled URLs and build static reports",
    long_about = "Audit a website crawl export.\n\n\
                  Reads one crawl CSV, applies the SEO rule catalog and writes\n\
                  CSV artifacts, a SpreadsheetML workbook, SVG charts and an HTML dashboard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Audit a crawl export and write all reports.
    Run(RunArgs),

    /// List the rule catalog with its effective thresholds.
    Rules(RulesArgs),

    /// Render the dashboard from an existing reports directory.
    Dashboard(DashboardArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Crawl export (CSV) to audit.
    #[arg(value_name = "CRAWL_CSV")]
    pub crawl_csv: PathBuf,

    /// Directory for generated files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "reports")]
    pub output_dir: PathBuf,

    /// Threshold overrides (TOML with a [thresholds] table).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Evaluate and summarize without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Threshold overrides (TOML with a [thresholds] table).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DashboardArgs {
    /// Directory holding the workbook and chart data of a previous run.
    #[arg(long = "reports-dir", value_name = "DIR", default_value = "reports")]
    pub reports_dir: PathBuf,

    /// Output HTML file (default: <REPORTS_DIR>/dashboard.html).
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
