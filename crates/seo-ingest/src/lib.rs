//! Loader stage of the crawl audit.
//!
//! Reads one crawl export into memory as trimmed strings, normalizes header
//! identifiers and checks the column contract before any typing happens.

pub mod csv_table;
pub mod error;
pub mod missing;
pub mod schema;

pub use csv_table::{CrawlExport, RawTable, load_crawl_export, normalize_header, read_raw_table};
pub use error::{IngestError, Result};
pub use missing::{MISSING_TOKENS, is_missing_token};
pub use schema::{CrawlSchema, validate_schema};
