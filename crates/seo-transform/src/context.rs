//! Pipeline run context.
//!
//! A [`PipelineRun`] is built once per invocation and borrowed by the rule
//! engine and the report builder. It owns the normalized crawl and fixes the
//! reference time used by age-based rules, so two evaluations of the same
//! run always agree.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use seo_model::{PageRecord, Partition};

use crate::normalize::{NormalizationStats, NormalizedCrawl};

#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Export the crawl was loaded from, if any.
    pub source: Option<PathBuf>,
    /// Reference time for age-based rules, in UTC.
    pub run_at: NaiveDateTime,
    crawl: NormalizedCrawl,
}

impl PipelineRun {
    pub fn new(crawl: NormalizedCrawl, run_at: NaiveDateTime) -> Self {
        Self {
            source: None,
            run_at,
            crawl,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn pages(&self) -> &[PageRecord] {
        self.crawl.pages()
    }

    pub fn rows(&self, partition: Partition) -> Vec<&PageRecord> {
        self.crawl.rows(partition)
    }

    pub fn partition_len(&self, partition: Partition) -> usize {
        self.crawl.partition_len(partition)
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.crawl.stats
    }
}
