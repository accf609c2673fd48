//! The rule catalog.
//!
//! [`RuleCatalog::standard`] builds the audit's rule table from
//! [`Thresholds`]. Additional rules are registered through
//! [`RuleCatalog::builder`] without touching the engine.

use std::collections::BTreeSet;

use seo_model::{Column, Partition};

use crate::config::Thresholds;
use crate::error::{Result, RuleError};
use crate::ids;
use crate::predicate::Predicate;

/// What a rule computes over its partition.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Rows satisfying the predicate.
    Filter(Predicate),
    /// Row count per distinct value, missing values excluded.
    CountBy(Column),
    /// Values of `key` shared by two or more rows, each with the `member`
    /// values of those rows.
    DuplicateGroups { key: Column, member: Column },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub descending: bool,
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub id: String,
    pub name: String,
    pub partition: Partition,
    pub kind: RuleKind,
    /// Output columns of filter rules, in order. Empty keeps every column.
    pub projection: Vec<Column>,
    pub sort: Option<SortKey>,
    /// File stem of the standalone artifact, `None` for bundle-only rules.
    pub artifact: Option<String>,
}

impl RuleSpec {
    pub fn filter(
        id: impl Into<String>,
        name: impl Into<String>,
        partition: Partition,
        predicate: Predicate,
    ) -> Self {
        Self::with_kind(id, name, partition, RuleKind::Filter(predicate))
    }

    pub fn count_by(
        id: impl Into<String>,
        name: impl Into<String>,
        partition: Partition,
        column: Column,
    ) -> Self {
        Self::with_kind(id, name, partition, RuleKind::CountBy(column))
    }

    pub fn duplicate_groups(
        id: impl Into<String>,
        name: impl Into<String>,
        partition: Partition,
        key: Column,
        member: Column,
    ) -> Self {
        Self::with_kind(id, name, partition, RuleKind::DuplicateGroups { key, member })
    }

    fn with_kind(
        id: impl Into<String>,
        name: impl Into<String>,
        partition: Partition,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            partition,
            kind,
            projection: Vec::new(),
            sort: None,
            artifact: None,
        }
    }

    #[must_use]
    pub fn project(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.projection = columns.into_iter().collect();
        self
    }

    #[must_use]
    pub fn sort_ascending(mut self, column: Column) -> Self {
        self.sort = Some(SortKey {
            column,
            descending: false,
        });
        self
    }

    #[must_use]
    pub fn sort_descending(mut self, column: Column) -> Self {
        self.sort = Some(SortKey {
            column,
            descending: true,
        });
        self
    }

    #[must_use]
    pub fn artifact(mut self, stem: impl Into<String>) -> Self {
        self.artifact = Some(stem.into());
        self
    }

    /// Output columns, expanding an empty projection to the full contract.
    pub fn output_columns(&self) -> Vec<Column> {
        if self.projection.is_empty() {
            Column::ALL.to_vec()
        } else {
            self.projection.clone()
        }
    }

    /// One-line description for listings.
    pub fn describe(&self) -> String {
        match &self.kind {
            RuleKind::Filter(predicate) => predicate.to_string(),
            RuleKind::CountBy(column) => format!("count by {column}"),
            RuleKind::DuplicateGroups { key, .. } => format!("{key} shared by 2+ rows"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<RuleSpec>,
}

impl RuleCatalog {
    pub fn builder() -> RuleCatalogBuilder {
        RuleCatalogBuilder::default()
    }

    /// The standard audit catalog.
    pub fn standard(thresholds: &Thresholds) -> Result<Self> {
        thresholds.validate()?;
        let t = thresholds;
        Self::builder()
            .rule(
                RuleSpec::count_by(
                    ids::STATUS_DISTRIBUTION,
                    "Status Distribution",
                    Partition::All,
                    Column::StatusCode,
                )
                .artifact("status_codes"),
            )
            .rule(
                RuleSpec::filter(
                    ids::SLOW_PAGES,
                    "Slow Pages",
                    Partition::All,
                    Predicate::GreaterThan {
                        column: Column::ResponseTime,
                        threshold: t.slow_response_secs,
                    },
                )
                .project([Column::Address, Column::ResponseTime, Column::StatusCode])
                .artifact("slow_pages"),
            )
            .rule(
                RuleSpec::filter(
                    ids::NON_INDEXABLE,
                    "Non-Indexable",
                    Partition::All,
                    Predicate::Contains {
                        column: Column::IndexabilityStatus,
                        needle: t.non_indexable_marker.clone(),
                    },
                )
                .project([Column::Address, Column::IndexabilityStatus])
                .artifact("non_indexable"),
            )
            .rule(
                RuleSpec::filter(
                    ids::MISSING_CANONICAL,
                    "Missing Canonical",
                    Partition::All,
                    Predicate::IsMissing {
                        column: Column::CanonicalLink,
                    },
                )
                .project([Column::Address, Column::Indexability])
                .artifact("missing_canonical"),
            )
            .rule(
                RuleSpec::filter(
                    ids::SUBOPTIMAL_TITLES,
                    "Suboptimal Titles",
                    Partition::Html,
                    Predicate::Outside {
                        column: Column::TitleLength,
                        min: t.title_length_min,
                        max: t.title_length_max,
                    },
                )
                .project([Column::Address, Column::Title, Column::TitleLength])
                .artifact("suboptimal_titles"),
            )
            .rule(
                RuleSpec::filter(
                    ids::SUBOPTIMAL_METAS,
                    "Suboptimal Metas",
                    Partition::Html,
                    Predicate::Outside {
                        column: Column::MetaDescriptionLength,
                        min: t.meta_length_min,
                        max: t.meta_length_max,
                    },
                )
                .project([
                    Column::Address,
                    Column::MetaDescription,
                    Column::MetaDescriptionLength,
                ])
                .artifact("suboptimal_metas"),
            )
            .rule(
                RuleSpec::duplicate_groups(
                    ids::DUPLICATE_TITLES,
                    "Duplicate Titles",
                    Partition::Html,
                    Column::Title,
                    Column::Address,
                )
                .artifact("duplicate_titles"),
            )
            .rule(
                RuleSpec::filter(
                    ids::THIN_CONTENT,
                    "Thin Content",
                    Partition::Html,
                    Predicate::LessThan {
                        column: Column::WordCount,
                        threshold: t.thin_word_count,
                    },
                )
                .project([Column::Address, Column::WordCount, Column::FleschScore])
                .artifact("thin_pages"),
            )
            .rule(
                RuleSpec::filter(
                    ids::LOW_READABILITY,
                    "Low Readability",
                    Partition::Html,
                    Predicate::LessThan {
                        column: Column::FleschScore,
                        threshold: t.low_readability_score,
                    },
                )
                .project([Column::Address, Column::FleschScore])
                .artifact("low_readability"),
            )
            .rule(
                RuleSpec::filter(
                    ids::NEAR_DUPLICATES,
                    "Near Duplicates",
                    Partition::Html,
                    Predicate::GreaterThan {
                        column: Column::NearDuplicates,
                        threshold: t.near_duplicate_count,
                    },
                )
                .project([Column::Address, Column::SimilarityScore])
                .sort_descending(Column::SimilarityScore)
                .artifact("near_duplicates"),
            )
            .rule(
                RuleSpec::filter(
                    ids::DEEP_PAGES,
                    "Deep Pages",
                    Partition::All,
                    Predicate::GreaterThan {
                        column: Column::CrawlDepth,
                        threshold: t.deep_crawl_depth,
                    },
                )
                .project([Column::Address, Column::CrawlDepth, Column::Inlinks])
                .artifact("deep_pages"),
            )
            .rule(
                RuleSpec::filter(
                    ids::LOW_INLINKS,
                    "Low Inlinks",
                    Partition::All,
                    Predicate::LessThan {
                        column: Column::Inlinks,
                        threshold: t.low_inlinks,
                    },
                )
                .project([Column::Address, Column::Inlinks, Column::LinkScore])
                .sort_ascending(Column::LinkScore)
                .artifact("low_inlinks"),
            )
            .rule(
                RuleSpec::filter(
                    ids::LARGE_PAGES,
                    "Large Pages",
                    Partition::All,
                    Predicate::GreaterThan {
                        column: Column::SizeBytes,
                        threshold: t.large_page_bytes,
                    },
                )
                .project([Column::Address, Column::SizeBytes, Column::ContentType])
                .artifact("large_pages"),
            )
            .rule(
                RuleSpec::filter(
                    ids::OUTDATED_PAGES,
                    "Outdated Pages",
                    Partition::All,
                    Predicate::OlderThan {
                        column: Column::LastModified,
                        days: t.outdated_days,
                    },
                )
                .project([Column::Address, Column::LastModified])
                .artifact("outdated_pages"),
            )
            .rule(
                RuleSpec::filter(
                    ids::HTTP11_PAGES,
                    "HTTP 1.1 Pages",
                    Partition::All,
                    Predicate::Equals {
                        column: Column::HttpVersion,
                        expected: t.legacy_http_version.clone(),
                    },
                )
                .project([Column::Address, Column::HttpVersion])
                .artifact("old_http_pages"),
            )
            .rule(
                RuleSpec::filter(ids::HTML_PAGES, "HTML Pages", Partition::Html, Predicate::Always)
                    .project([
                        Column::Address,
                        Column::StatusCode,
                        Column::Title,
                        Column::MetaDescription,
                        Column::WordCount,
                    ]),
            )
            .rule(
                RuleSpec::filter(
                    ids::CLIENT_ERRORS,
                    "4xx Errors",
                    Partition::All,
                    Predicate::Between {
                        column: Column::StatusCode,
                        min: t.client_error_min,
                        max: t.client_error_max,
                    },
                )
                .project([Column::Address, Column::StatusCode])
                .artifact("client_errors"),
            )
            .build()
    }

    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&RuleSpec> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RuleCatalogBuilder {
    rules: Vec<RuleSpec>,
}

impl RuleCatalogBuilder {
    #[must_use]
    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// Finishes the catalog, rejecting duplicate ids.
    pub fn build(self) -> Result<RuleCatalog> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleError::DuplicateRule {
                    id: rule.id.clone(),
                });
            }
        }
        Ok(RuleCatalog { rules: self.rules })
    }
}
