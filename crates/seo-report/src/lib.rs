//! Report stage of the crawl audit.
//!
//! Turns one engine pass into files: the consolidated workbook, a CSV per
//! rule, the normalized snapshot, chart data with its SVG images, and the
//! static dashboard that reads them back.

pub mod artifacts;
pub mod bundle;
pub mod charts;
pub mod dashboard;
pub mod error;
pub mod outputs;
pub mod stats;
pub mod workbook;

pub use artifacts::{
    CLEANED_DATA_FILE, artifact_file, write_cleaned_data, write_rule_artifacts, write_table_csv,
};
pub use bundle::{BUNDLE_SHEETS, SheetSpec, build_bundle, build_bundle_with};
pub use charts::{render_svg, write_chart_image};
pub use dashboard::{
    DASHBOARD_FILE, DashboardData, DashboardStatus, Section, SectionToggles, render_dashboard,
    render_error_page, write_dashboard,
};
pub use error::{ReportError, Result};
pub use outputs::{ReportOutputs, write_reports};
pub use stats::{
    ChartData, SummaryStats, chart_data_file, chart_image_file, compute_charts, write_chart_data,
};
pub use workbook::{WORKBOOK_FILE, read_workbook, write_workbook};
