//! Normalizer stage of the crawl audit.
//!
//! Turns a loaded export into typed [`PageRecord`](seo_model::PageRecord)s,
//! drops duplicate addresses and derives the HTML partition. The result is
//! wrapped in a [`PipelineRun`] that every later stage borrows.

pub mod context;
pub mod dedupe;
pub mod normalization;
pub mod normalize;

pub use context::PipelineRun;
pub use dedupe::dedupe_by_address;
pub use normalization::datetime::parse_timestamp;
pub use normalization::numeric::parse_number;
pub use normalize::{
    DEFAULT_HTML_MARKER, NormalizationStats, NormalizeOptions, NormalizedCrawl, normalize_export,
    normalize_records,
};
