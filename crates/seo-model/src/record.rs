use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::value::Value;

/// One normalized crawl row.
///
/// Every field except the address key may be missing. Numeric columns are
/// stored as `f64` regardless of their integral nature so all threshold
/// comparisons share one code path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub address: String,
    pub status_code: Option<f64>,
    pub content_type: Option<String>,
    pub response_time: Option<f64>,
    pub indexability: Option<String>,
    pub indexability_status: Option<String>,
    pub canonical_link: Option<String>,
    pub title: Option<String>,
    pub title_length: Option<f64>,
    pub meta_description: Option<String>,
    pub meta_description_length: Option<f64>,
    pub word_count: Option<f64>,
    pub flesch_score: Option<f64>,
    pub near_duplicates: Option<f64>,
    pub similarity_score: Option<f64>,
    pub crawl_depth: Option<f64>,
    pub inlinks: Option<f64>,
    pub outlinks: Option<f64>,
    pub link_score: Option<f64>,
    pub size_bytes: Option<f64>,
    pub last_modified: Option<NaiveDateTime>,
    pub http_version: Option<String>,
}

impl PageRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Reads a cell by column.
    pub fn value(&self, column: Column) -> Value {
        match column {
            Column::Address => Value::Text(self.address.clone()),
            Column::StatusCode => self.status_code.into(),
            Column::ContentType => self.content_type.as_deref().into(),
            Column::ResponseTime => self.response_time.into(),
            Column::Indexability => self.indexability.as_deref().into(),
            Column::IndexabilityStatus => self.indexability_status.as_deref().into(),
            Column::CanonicalLink => self.canonical_link.as_deref().into(),
            Column::Title => self.title.as_deref().into(),
            Column::TitleLength => self.title_length.into(),
            Column::MetaDescription => self.meta_description.as_deref().into(),
            Column::MetaDescriptionLength => self.meta_description_length.into(),
            Column::WordCount => self.word_count.into(),
            Column::FleschScore => self.flesch_score.into(),
            Column::NearDuplicates => self.near_duplicates.into(),
            Column::SimilarityScore => self.similarity_score.into(),
            Column::CrawlDepth => self.crawl_depth.into(),
            Column::Inlinks => self.inlinks.into(),
            Column::Outlinks => self.outlinks.into(),
            Column::LinkScore => self.link_score.into(),
            Column::SizeBytes => self.size_bytes.into(),
            Column::LastModified => self.last_modified.into(),
            Column::HttpVersion => self.http_version.as_deref().into(),
        }
    }

    /// Writes a cell by column. Values whose type does not fit the column
    /// kind are stored as missing; a non-text address leaves the key as is.
    pub fn set(&mut self, column: Column, value: &Value) {
        let text = value.as_text().map(str::to_string);
        let number = value.as_number();
        match column {
            Column::Address => {
                if let Some(address) = text {
                    self.address = address;
                }
            }
            Column::StatusCode => self.status_code = number,
            Column::ContentType => self.content_type = text,
            Column::ResponseTime => self.response_time = number,
            Column::Indexability => self.indexability = text,
            Column::IndexabilityStatus => self.indexability_status = text,
            Column::CanonicalLink => self.canonical_link = text,
            Column::Title => self.title = text,
            Column::TitleLength => self.title_length = number,
            Column::MetaDescription => self.meta_description = text,
            Column::MetaDescriptionLength => self.meta_description_length = number,
            Column::WordCount => self.word_count = number,
            Column::FleschScore => self.flesch_score = number,
            Column::NearDuplicates => self.near_duplicates = number,
            Column::SimilarityScore => self.similarity_score = number,
            Column::CrawlDepth => self.crawl_depth = number,
            Column::Inlinks => self.inlinks = number,
            Column::Outlinks => self.outlinks = number,
            Column::LinkScore => self.link_score = number,
            Column::SizeBytes => self.size_bytes = number,
            Column::LastModified => self.last_modified = value.as_timestamp(),
            Column::HttpVersion => self.http_version = text,
        }
    }

    /// Numeric cell, `None` when missing or when the column is not numeric.
    pub fn number(&self, column: Column) -> Option<f64> {
        self.value(column).as_number()
    }

    /// Text cell borrowed from the record, `None` when missing or non-text.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Address => Some(self.address.as_str()),
            Column::ContentType => self.content_type.as_deref(),
            Column::Indexability => self.indexability.as_deref(),
            Column::IndexabilityStatus => self.indexability_status.as_deref(),
            Column::CanonicalLink => self.canonical_link.as_deref(),
            Column::Title => self.title.as_deref(),
            Column::MetaDescription => self.meta_description.as_deref(),
            Column::HttpVersion => self.http_version.as_deref(),
            _ => None,
        }
    }

    pub fn is_html(&self, marker: &str) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains(marker))
    }

    pub fn project(&self, columns: &[Column]) -> Vec<Value> {
        columns.iter().map(|column| self.value(*column)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_marker_is_case_sensitive() {
        let mut record = PageRecord::new("https://example.com/");
        record.content_type = Some("text/html; charset=UTF-8".to_string());
        assert!(record.is_html("text/html"));
        record.content_type = Some("TEXT/HTML".to_string());
        assert!(!record.is_html("text/html"));
        record.content_type = None;
        assert!(!record.is_html("text/html"));
    }

    #[test]
    fn set_ignores_mismatched_kinds() {
        let mut record = PageRecord::new("https://example.com/");
        record.set(Column::WordCount, &Value::Number(320.0));
        assert_eq!(record.word_count, Some(320.0));
        record.set(Column::WordCount, &Value::Text("many".to_string()));
        assert_eq!(record.word_count, None);
        record.set(Column::Address, &Value::Missing);
        assert_eq!(record.address, "https://example.com/");
    }

    #[test]
    fn empty_canonical_is_not_missing() {
        let mut record = PageRecord::new("https://example.com/");
        record.canonical_link = Some(String::new());
        assert_eq!(record.value(Column::CanonicalLink), Value::Text(String::new()));
        record.canonical_link = None;
        assert!(record.value(Column::CanonicalLink).is_missing());
    }
}
