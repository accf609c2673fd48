//! Consolidated report bundle.
//!
//! The bundle is a fixed, ordered list of sheets. Each sheet re-projects one
//! filter rule's rows, which may be narrower than the rule's own artifact.

use std::time::Instant;

use seo_model::{Column, OutputBundle, Sheet};
use seo_rules::{RuleResults, ids};
use tracing::{debug, info, info_span};

use crate::error::{ReportError, Result};

/// One sheet of the bundle: its name, source rule and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSpec {
    pub name: &'static str,
    pub rule: &'static str,
    pub columns: &'static [Column],
}

pub const HTML_PAGES_SHEET: &str = "HTML Pages";
pub const CLIENT_ERRORS_SHEET: &str = "4xx Errors";
pub const SLOW_PAGES_SHEET: &str = "Slow Pages";
pub const MISSING_CANONICAL_SHEET: &str = "Missing Canonical";
pub const SUBOPTIMAL_TITLES_SHEET: &str = "Suboptimal Titles";
pub const SUBOPTIMAL_METAS_SHEET: &str = "Suboptimal Metas";
pub const THIN_CONTENT_SHEET: &str = "Thin Content";
pub const LOW_READABILITY_SHEET: &str = "Low Readability";
pub const NEAR_DUPLICATES_SHEET: &str = "Near Duplicates";
pub const DEEP_PAGES_SHEET: &str = "Deep Pages";
pub const LOW_INLINKS_SHEET: &str = "Low Inlinks";
pub const LARGE_PAGES_SHEET: &str = "Large Pages";
pub const OUTDATED_PAGES_SHEET: &str = "Outdated Pages";
pub const HTTP11_PAGES_SHEET: &str = "HTTP 1.1 Pages";

/// Sheets of the bundle, in workbook order.
pub const BUNDLE_SHEETS: [SheetSpec; 14] = [
    SheetSpec {
        name: HTML_PAGES_SHEET,
        rule: ids::HTML_PAGES,
        columns: &[
            Column::Address,
            Column::StatusCode,
            Column::Title,
            Column::MetaDescription,
            Column::WordCount,
        ],
    },
    SheetSpec {
        name: CLIENT_ERRORS_SHEET,
        rule: ids::CLIENT_ERRORS,
        columns: &[Column::Address, Column::StatusCode],
    },
    SheetSpec {
        name: SLOW_PAGES_SHEET,
        rule: ids::SLOW_PAGES,
        columns: &[Column::Address, Column::ResponseTime],
    },
    SheetSpec {
        name: MISSING_CANONICAL_SHEET,
        rule: ids::MISSING_CANONICAL,
        columns: &[Column::Address, Column::Indexability],
    },
    SheetSpec {
        name: SUBOPTIMAL_TITLES_SHEET,
        rule: ids::SUBOPTIMAL_TITLES,
        columns: &[Column::Address, Column::Title, Column::TitleLength],
    },
    SheetSpec {
        name: SUBOPTIMAL_METAS_SHEET,
        rule: ids::SUBOPTIMAL_METAS,
        columns: &[
            Column::Address,
            Column::MetaDescription,
            Column::MetaDescriptionLength,
        ],
    },
    SheetSpec {
        name: THIN_CONTENT_SHEET,
        rule: ids::THIN_CONTENT,
        columns: &[Column::Address, Column::WordCount],
    },
    SheetSpec {
        name: LOW_READABILITY_SHEET,
        rule: ids::LOW_READABILITY,
        columns: &[Column::Address, Column::FleschScore],
    },
    SheetSpec {
        name: NEAR_DUPLICATES_SHEET,
        rule: ids::NEAR_DUPLICATES,
        columns: &[Column::Address, Column::SimilarityScore],
    },
    SheetSpec {
        name: DEEP_PAGES_SHEET,
        rule: ids::DEEP_PAGES,
        columns: &[Column::Address, Column::CrawlDepth],
    },
    SheetSpec {
        name: LOW_INLINKS_SHEET,
        rule: ids::LOW_INLINKS,
        columns: &[Column::Address, Column::Inlinks, Column::LinkScore],
    },
    SheetSpec {
        name: LARGE_PAGES_SHEET,
        rule: ids::LARGE_PAGES,
        columns: &[Column::Address, Column::SizeBytes],
    },
    SheetSpec {
        name: OUTDATED_PAGES_SHEET,
        rule: ids::OUTDATED_PAGES,
        columns: &[Column::Address, Column::LastModified],
    },
    SheetSpec {
        name: HTTP11_PAGES_SHEET,
        rule: ids::HTTP11_PAGES,
        columns: &[Column::Address, Column::HttpVersion],
    },
];

/// Builds the standard bundle from one engine pass.
pub fn build_bundle(results: &RuleResults<'_>) -> Result<OutputBundle> {
    build_bundle_with(results, &BUNDLE_SHEETS)
}

/// Builds a bundle from an explicit sheet list.
pub fn build_bundle_with(results: &RuleResults<'_>, sheets: &[SheetSpec]) -> Result<OutputBundle> {
    let span = info_span!("report", stage = "bundle");
    let _guard = span.enter();
    let start = Instant::now();

    let mut bundle = OutputBundle::default();
    for spec in sheets {
        let result = results.get(spec.rule).ok_or_else(|| ReportError::MissingRule {
            sheet: spec.name.to_string(),
            rule: spec.rule.to_string(),
        })?;
        let table = result
            .project(spec.columns)
            .ok_or_else(|| ReportError::UnsupportedSheet {
                sheet: spec.name.to_string(),
                rule: spec.rule.to_string(),
            })?;
        debug!(sheet = spec.name, row_count = table.len(), "sheet built");
        bundle.sheets.push(Sheet::new(spec.name, table));
    }

    info!(
        sheet_count = bundle.sheets.len(),
        duration_ms = start.elapsed().as_millis(),
        "bundle built"
    );
    Ok(bundle)
}
