//! Stable identifiers of the standard rules.

pub const STATUS_DISTRIBUTION: &str = "status_distribution";
pub const SLOW_PAGES: &str = "slow_pages";
pub const NON_INDEXABLE: &str = "non_indexable";
pub const MISSING_CANONICAL: &str = "missing_canonical";
pub const SUBOPTIMAL_TITLES: &str = "suboptimal_titles";
pub const SUBOPTIMAL_METAS: &str = "suboptimal_metas";
pub const DUPLICATE_TITLES: &str = "duplicate_titles";
pub const THIN_CONTENT: &str = "thin_content";
pub const LOW_READABILITY: &str = "low_readability";
pub const NEAR_DUPLICATES: &str = "near_duplicates";
pub const DEEP_PAGES: &str = "deep_pages";
pub const LOW_INLINKS: &str = "low_inlinks";
pub const LARGE_PAGES: &str = "large_pages";
pub const OUTDATED_PAGES: &str = "outdated_pages";
pub const HTTP11_PAGES: &str = "http11_pages";
pub const HTML_PAGES: &str = "html_pages";
pub const CLIENT_ERRORS: &str = "client_errors";
