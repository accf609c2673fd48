//! Audit configuration.
//!
//! Every threshold of the standard catalog lives here so a site with other
//! conventions can tune the audit from an `audit.toml` without code changes:
//!
//! ```toml
//! [thresholds]
//! slow_response_secs = 0.8
//! title_length_max = 65
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use seo_transform::DEFAULT_HTML_MARKER;

use crate::error::{Result, RuleError};

/// Top-level contents of `audit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl AuditConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| RuleError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| RuleError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

/// Rule thresholds. Comparisons are strict unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Content-type substring selecting the HTML partition (case-sensitive).
    pub html_marker: String,
    /// Pages slower than this many seconds are slow.
    pub slow_response_secs: f64,
    /// Marker searched for in the indexability status.
    pub non_indexable_marker: String,
    pub title_length_min: f64,
    pub title_length_max: f64,
    pub meta_length_min: f64,
    pub meta_length_max: f64,
    /// Pages with fewer words are thin.
    pub thin_word_count: f64,
    /// Flesch reading ease below this is hard to read.
    pub low_readability_score: f64,
    /// Pages with more near duplicates than this are flagged.
    pub near_duplicate_count: f64,
    pub deep_crawl_depth: f64,
    pub low_inlinks: f64,
    pub large_page_bytes: f64,
    /// Pages last modified more than this many days before the run are outdated.
    pub outdated_days: i64,
    /// Exact `http version` value flagged as legacy transport.
    pub legacy_http_version: String,
    /// Inclusive status range reported as client errors.
    pub client_error_min: f64,
    pub client_error_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            html_marker: DEFAULT_HTML_MARKER.to_string(),
            slow_response_secs: 0.5,
            non_indexable_marker: "Non-Indexable".to_string(),
            title_length_min: 50.0,
            title_length_max: 60.0,
            meta_length_min: 150.0,
            meta_length_max: 160.0,
            thin_word_count: 300.0,
            low_readability_score: 60.0,
            near_duplicate_count: 0.0,
            deep_crawl_depth: 3.0,
            low_inlinks: 5.0,
            large_page_bytes: 100_000.0,
            outdated_days: 365,
            legacy_http_version: "1.1".to_string(),
            client_error_min: 400.0,
            client_error_max: 499.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let numeric = [
            ("slow_response_secs", self.slow_response_secs),
            ("title_length_min", self.title_length_min),
            ("title_length_max", self.title_length_max),
            ("meta_length_min", self.meta_length_min),
            ("meta_length_max", self.meta_length_max),
            ("thin_word_count", self.thin_word_count),
            ("low_readability_score", self.low_readability_score),
            ("near_duplicate_count", self.near_duplicate_count),
            ("deep_crawl_depth", self.deep_crawl_depth),
            ("low_inlinks", self.low_inlinks),
            ("large_page_bytes", self.large_page_bytes),
            ("client_error_min", self.client_error_min),
            ("client_error_max", self.client_error_max),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(RuleError::threshold(name, "must be a finite number"));
            }
        }
        check_range("title_length", self.title_length_min, self.title_length_max)?;
        check_range("meta_length", self.meta_length_min, self.meta_length_max)?;
        check_range("client_error", self.client_error_min, self.client_error_max)?;
        if self.outdated_days < 0 {
            return Err(RuleError::threshold("outdated_days", "must not be negative"));
        }
        let markers = [
            ("html_marker", &self.html_marker),
            ("non_indexable_marker", &self.non_indexable_marker),
            ("legacy_http_version", &self.legacy_http_version),
        ];
        for (name, value) in markers {
            if value.is_empty() {
                return Err(RuleError::threshold(name, "must not be empty"));
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    if min > max {
        return Err(RuleError::threshold(
            name,
            format!("minimum {min} exceeds maximum {max}"),
        ));
    }
    Ok(())
}
