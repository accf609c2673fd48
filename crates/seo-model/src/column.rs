//! Column contract of a crawl export.
//!
//! Headers are matched after normalization (trimmed, lower-cased), so
//! `Title 1 Length` and ` title 1 length` both resolve to [`Column::TitleLength`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Numeric,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Address,
    StatusCode,
    ContentType,
    ResponseTime,
    Indexability,
    IndexabilityStatus,
    CanonicalLink,
    Title,
    TitleLength,
    MetaDescription,
    MetaDescriptionLength,
    WordCount,
    FleschScore,
    NearDuplicates,
    SimilarityScore,
    CrawlDepth,
    Inlinks,
    Outlinks,
    LinkScore,
    SizeBytes,
    LastModified,
    HttpVersion,
}

impl Column {
    /// Every contract column in export order.
    pub const ALL: [Column; 22] = [
        Column::Address,
        Column::StatusCode,
        Column::ContentType,
        Column::ResponseTime,
        Column::Indexability,
        Column::IndexabilityStatus,
        Column::CanonicalLink,
        Column::Title,
        Column::TitleLength,
        Column::MetaDescription,
        Column::MetaDescriptionLength,
        Column::WordCount,
        Column::FleschScore,
        Column::NearDuplicates,
        Column::SimilarityScore,
        Column::CrawlDepth,
        Column::Inlinks,
        Column::Outlinks,
        Column::LinkScore,
        Column::SizeBytes,
        Column::LastModified,
        Column::HttpVersion,
    ];

    /// Normalized header name.
    pub const fn header(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::StatusCode => "status code",
            Self::ContentType => "content type",
            Self::ResponseTime => "response time",
            Self::Indexability => "indexability",
            Self::IndexabilityStatus => "indexability status",
            Self::CanonicalLink => "canonical link element 1",
            Self::Title => "title 1",
            Self::TitleLength => "title 1 length",
            Self::MetaDescription => "meta description 1",
            Self::MetaDescriptionLength => "meta description 1 length",
            Self::WordCount => "word count",
            Self::FleschScore => "flesch reading ease score",
            Self::NearDuplicates => "no. near duplicates",
            Self::SimilarityScore => "closest similarity match",
            Self::CrawlDepth => "crawl depth",
            Self::Inlinks => "inlinks",
            Self::Outlinks => "outlinks",
            Self::LinkScore => "link score",
            Self::SizeBytes => "size (bytes)",
            Self::LastModified => "last modified",
            Self::HttpVersion => "http version",
        }
    }

    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::Address
            | Self::ContentType
            | Self::Indexability
            | Self::IndexabilityStatus
            | Self::CanonicalLink
            | Self::Title
            | Self::MetaDescription
            | Self::HttpVersion => ColumnKind::Text,
            Self::LastModified => ColumnKind::Timestamp,
            Self::StatusCode
            | Self::ResponseTime
            | Self::TitleLength
            | Self::MetaDescriptionLength
            | Self::WordCount
            | Self::FleschScore
            | Self::NearDuplicates
            | Self::SimilarityScore
            | Self::CrawlDepth
            | Self::Inlinks
            | Self::Outlinks
            | Self::LinkScore
            | Self::SizeBytes => ColumnKind::Numeric,
        }
    }

    /// Whether an export lacking this column is rejected at load time.
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Indexability)
    }

    /// Looks up a column by an already-normalized header.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.header() == header)
    }

    pub fn required() -> impl Iterator<Item = Column> {
        Self::ALL.into_iter().filter(|column| column.is_required())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::from_header(&normalized).ok_or_else(|| ModelError::UnknownColumn(s.to_string()))
    }
}
