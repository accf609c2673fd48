//! Rule execution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use seo_model::{Column, PageRecord};
use seo_transform::PipelineRun;
use tracing::{debug, info, info_span};

use crate::catalog::{RuleCatalog, RuleKind, RuleSpec, SortKey};
use crate::predicate::EvalContext;
use crate::result::{DuplicateGroup, RuleOutput, RuleResult, RuleResults, ValueCount};

/// Evaluates a catalog against a pipeline run.
///
/// Each rule sees only its partition and never another rule's output, so
/// the results do not depend on catalog order.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: RuleCatalog,
}

impl RuleEngine {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn execute<'a>(&'a self, run: &'a PipelineRun) -> RuleResults<'a> {
        let span = info_span!("rules", rule_count = self.catalog.len());
        let _guard = span.enter();
        let start = Instant::now();
        let ctx = EvalContext { run_at: run.run_at };

        let results = self
            .catalog
            .rules()
            .iter()
            .map(|spec| {
                let output = evaluate(spec, run.rows(spec.partition), &ctx);
                let result = RuleResult { spec, output };
                debug!(
                    rule = %spec.id,
                    partition = %spec.partition,
                    matched = result.len(),
                    "rule evaluated"
                );
                result
            })
            .collect::<Vec<_>>();

        info!(
            rule_count = results.len(),
            duration_ms = start.elapsed().as_millis(),
            "rules complete"
        );
        RuleResults::new(results)
    }
}

fn evaluate<'a>(spec: &RuleSpec, rows: Vec<&'a PageRecord>, ctx: &EvalContext) -> RuleOutput<'a> {
    match &spec.kind {
        RuleKind::Filter(predicate) => {
            let mut matched: Vec<&PageRecord> = rows
                .into_iter()
                .filter(|record| predicate.matches(record, ctx))
                .collect();
            if let Some(sort) = spec.sort {
                sort_rows(&mut matched, sort);
            }
            RuleOutput::Rows(matched)
        }
        RuleKind::CountBy(column) => RuleOutput::Counts(count_by(&rows, *column)),
        RuleKind::DuplicateGroups { key, member } => {
            RuleOutput::Groups(duplicate_groups(&rows, *key, *member))
        }
    }
}

/// Stable sort; missing keys go last in either direction.
fn sort_rows(rows: &mut [&PageRecord], sort: SortKey) {
    rows.sort_by(|a, b| {
        let (left, right) = (a.value(sort.column), b.value(sort.column));
        match (left.is_missing(), right.is_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) if sort.descending => right.sort_cmp(&left),
            (false, false) => left.sort_cmp(&right),
        }
    });
}

/// Count descending, ties by value ascending. Missing values are not counted.
fn count_by(rows: &[&PageRecord], column: Column) -> Vec<ValueCount> {
    let mut counts: Vec<ValueCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in rows {
        let value = record.value(column);
        if value.is_missing() {
            continue;
        }
        let slot = *index.entry(value.to_string()).or_insert_with(|| {
            counts.push(ValueCount { value, count: 0 });
            counts.len() - 1
        });
        counts[slot].count += 1;
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.sort_cmp(&b.value)));
    counts
}

/// Groups by `key` in ascending key order, keeping only keys seen twice or
/// more. Rows with a missing key are not grouped.
fn duplicate_groups(rows: &[&PageRecord], key: Column, member: Column) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in rows {
        let value = record.value(key);
        if value.is_missing() {
            continue;
        }
        groups
            .entry(value.to_string())
            .or_default()
            .push(record.value(member).to_string());
    }
    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(key, members)| DuplicateGroup { key, members })
        .collect()
}
