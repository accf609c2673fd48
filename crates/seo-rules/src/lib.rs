//! Rule engine of the crawl audit.
//!
//! Rules are data: each [`RuleSpec`] names a partition, a [`Predicate`] (or
//! an aggregation), an output projection and an optional sort key. The
//! [`RuleEngine`] evaluates every rule of a [`RuleCatalog`] independently
//! against a borrowed [`PipelineRun`](seo_transform::PipelineRun).

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod predicate;
pub mod result;

pub use catalog::{RuleCatalog, RuleCatalogBuilder, RuleKind, RuleSpec, SortKey};
pub use config::{AuditConfig, Thresholds};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use predicate::{EvalContext, Predicate};
pub use result::{
    DuplicateGroup, GROUP_MEMBER_SEPARATOR, RuleOutput, RuleResult, RuleResults, ValueCount,
};
