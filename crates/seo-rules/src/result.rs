//! Outputs of rule evaluation.
//!
//! Filter rules keep borrowed rows of the run so every result relation is,
//! by construction, a subset of its partition. Aggregation rules own their
//! small summaries.

use serde::Serialize;
use seo_model::{Column, PageRecord, Table, Value};

use crate::catalog::{RuleKind, RuleSpec};

/// Separator between member values of a duplicate group in tabular output.
pub const GROUP_MEMBER_SEPARATOR: &str = "; ";

/// A value shared by two or more rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    /// Member values in relation order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutput<'a> {
    Rows(Vec<&'a PageRecord>),
    Groups(Vec<DuplicateGroup>),
    Counts(Vec<ValueCount>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult<'a> {
    pub spec: &'a RuleSpec,
    pub output: RuleOutput<'a>,
}

impl<'a> RuleResult<'a> {
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Matched rows, groups or distinct values.
    pub fn len(&self) -> usize {
        match &self.output {
            RuleOutput::Rows(rows) => rows.len(),
            RuleOutput::Groups(groups) => groups.len(),
            RuleOutput::Counts(counts) => counts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> Option<&[&'a PageRecord]> {
        match &self.output {
            RuleOutput::Rows(rows) => Some(rows.as_slice()),
            _ => None,
        }
    }

    /// The result in its own output shape.
    pub fn to_table(&self) -> Table {
        match (&self.output, &self.spec.kind) {
            (RuleOutput::Rows(rows), _) => project_rows(rows, &self.spec.output_columns()),
            (RuleOutput::Groups(groups), RuleKind::DuplicateGroups { key, member }) => {
                let mut table = Table::new(vec![key.header().to_string(), member.header().to_string()]);
                for group in groups {
                    table.push_row(vec![
                        Value::Text(group.key.clone()),
                        Value::Text(group.members.join(GROUP_MEMBER_SEPARATOR)),
                    ]);
                }
                table
            }
            (RuleOutput::Counts(counts), RuleKind::CountBy(column)) => {
                let mut table = Table::new(vec![column.header().to_string(), "count".to_string()]);
                for entry in counts {
                    table.push_row(vec![entry.value.clone(), Value::Number(entry.count as f64)]);
                }
                table
            }
            (RuleOutput::Groups(_) | RuleOutput::Counts(_), _) => Table::default(),
        }
    }

    /// Row output re-projected onto `columns`; `None` for aggregations.
    pub fn project(&self, columns: &[Column]) -> Option<Table> {
        self.rows().map(|rows| project_rows(rows, columns))
    }
}

fn project_rows(rows: &[&PageRecord], columns: &[Column]) -> Table {
    let mut table = Table::new(columns.iter().map(|c| c.header().to_string()).collect());
    for row in rows {
        table.push_row(row.project(columns));
    }
    table
}

/// Results of one engine pass, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleResults<'a> {
    results: Vec<RuleResult<'a>>,
}

impl<'a> RuleResults<'a> {
    pub(crate) fn new(results: Vec<RuleResult<'a>>) -> Self {
        Self { results }
    }

    pub fn get(&self, id: &str) -> Option<&RuleResult<'a>> {
        self.results.iter().find(|result| result.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleResult<'a>> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// `(id, name, matched)` per rule.
    pub fn counts(&self) -> Vec<(&str, &str, usize)> {
        self.results
            .iter()
            .map(|result| (result.id(), result.spec.name.as_str(), result.len()))
            .collect()
    }
}
