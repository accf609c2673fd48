//! Row predicates.
//!
//! Missing cells never satisfy a comparison. Only [`Predicate::IsMissing`]
//! matches them.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use seo_model::{Column, PageRecord, value::format_numeric};

/// Per-run inputs a predicate may depend on.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub run_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every row of the partition.
    Always,
    GreaterThan { column: Column, threshold: f64 },
    LessThan { column: Column, threshold: f64 },
    /// `value < min || value > max`.
    Outside { column: Column, min: f64, max: f64 },
    /// `min <= value <= max`.
    Between { column: Column, min: f64, max: f64 },
    /// Case-sensitive substring match.
    Contains { column: Column, needle: String },
    /// Exact string match, no normalization.
    Equals { column: Column, expected: String },
    IsMissing { column: Column },
    /// Timestamp strictly older than `run_at - days`.
    OlderThan { column: Column, days: i64 },
}

impl Predicate {
    pub fn matches(&self, record: &PageRecord, ctx: &EvalContext) -> bool {
        match self {
            Self::Always => true,
            Self::GreaterThan { column, threshold } => {
                record.number(*column).is_some_and(|value| value > *threshold)
            }
            Self::LessThan { column, threshold } => {
                record.number(*column).is_some_and(|value| value < *threshold)
            }
            Self::Outside { column, min, max } => record
                .number(*column)
                .is_some_and(|value| value < *min || value > *max),
            Self::Between { column, min, max } => record
                .number(*column)
                .is_some_and(|value| *min <= value && value <= *max),
            Self::Contains { column, needle } => record
                .text(*column)
                .is_some_and(|value| value.contains(needle.as_str())),
            Self::Equals { column, expected } => {
                record.text(*column).is_some_and(|value| value == expected.as_str())
            }
            Self::IsMissing { column } => record.value(*column).is_missing(),
            Self::OlderThan { column, days } => {
                let Some(cutoff) = TimeDelta::try_days(*days)
                    .and_then(|age| ctx.run_at.checked_sub_signed(age))
                else {
                    return false;
                };
                record
                    .value(*column)
                    .as_timestamp()
                    .is_some_and(|value| value < cutoff)
            }
        }
    }

    /// Column the predicate reads, if any.
    pub fn column(&self) -> Option<Column> {
        match self {
            Self::Always => None,
            Self::GreaterThan { column, .. }
            | Self::LessThan { column, .. }
            | Self::Outside { column, .. }
            | Self::Between { column, .. }
            | Self::Contains { column, .. }
            | Self::Equals { column, .. }
            | Self::IsMissing { column }
            | Self::OlderThan { column, .. } => Some(*column),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("all rows"),
            Self::GreaterThan { column, threshold } => {
                write!(f, "{column} > {}", format_numeric(*threshold))
            }
            Self::LessThan { column, threshold } => {
                write!(f, "{column} < {}", format_numeric(*threshold))
            }
            Self::Outside { column, min, max } => write!(
                f,
                "{column} < {} or > {}",
                format_numeric(*min),
                format_numeric(*max)
            ),
            Self::Between { column, min, max } => write!(
                f,
                "{} <= {column} <= {}",
                format_numeric(*min),
                format_numeric(*max)
            ),
            Self::Contains { column, needle } => write!(f, "{column} contains \"{needle}\""),
            Self::Equals { column, expected } => write!(f, "{column} = \"{expected}\""),
            Self::IsMissing { column } => write!(f, "{column} is missing"),
            Self::OlderThan { column, days } => write!(f, "{column} older than {days} days"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ctx() -> EvalContext {
        EvalContext {
            run_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                .and_then(|date| date.and_hms_opt(12, 0, 0))
                .expect("valid date"),
        }
    }

    fn titled(length: f64) -> PageRecord {
        let mut record = PageRecord::new(format!("https://example.com/{length}"));
        record.title_length = Some(length);
        record
    }

    #[test]
    fn outside_is_strict_at_both_bounds() {
        let predicate = Predicate::Outside {
            column: Column::TitleLength,
            min: 50.0,
            max: 60.0,
        };
        assert!(predicate.matches(&titled(49.0), &ctx()));
        assert!(!predicate.matches(&titled(50.0), &ctx()));
        assert!(!predicate.matches(&titled(60.0), &ctx()));
        assert!(predicate.matches(&titled(61.0), &ctx()));
    }

    #[test]
    fn comparisons_never_match_missing() {
        let record = PageRecord::new("https://example.com/");
        let predicates = [
            Predicate::GreaterThan {
                column: Column::ResponseTime,
                threshold: -1.0,
            },
            Predicate::LessThan {
                column: Column::Inlinks,
                threshold: f64::MAX,
            },
            Predicate::Contains {
                column: Column::IndexabilityStatus,
                needle: String::new(),
            },
            Predicate::Equals {
                column: Column::HttpVersion,
                expected: String::new(),
            },
            Predicate::OlderThan {
                column: Column::LastModified,
                days: 0,
            },
        ];
        for predicate in predicates {
            assert!(!predicate.matches(&record, &ctx()), "{predicate}");
        }
        assert!(Predicate::IsMissing {
            column: Column::CanonicalLink
        }
        .matches(&record, &ctx()));
    }

    #[test]
    fn equals_is_exact() {
        let predicate = Predicate::Equals {
            column: Column::HttpVersion,
            expected: "1.1".to_string(),
        };
        let mut record = PageRecord::new("https://example.com/");
        record.http_version = Some("1.1".to_string());
        assert!(predicate.matches(&record, &ctx()));
        record.http_version = Some("HTTP/1.1".to_string());
        assert!(!predicate.matches(&record, &ctx()));
        record.http_version = Some("2".to_string());
        assert!(!predicate.matches(&record, &ctx()));
    }

    #[test]
    fn older_than_uses_run_time() {
        let predicate = Predicate::OlderThan {
            column: Column::LastModified,
            days: 365,
        };
        let mut record = PageRecord::new("https://example.com/");
        record.last_modified = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0));
        assert!(predicate.matches(&record, &ctx()));
        record.last_modified = NaiveDate::from_ymd_opt(2024, 6, 2)
            .and_then(|date| date.and_hms_opt(0, 0, 0));
        assert!(!predicate.matches(&record, &ctx()));
    }

    #[test]
    fn display_reads_like_the_rule() {
        let predicate = Predicate::GreaterThan {
            column: Column::SizeBytes,
            threshold: 100_000.0,
        };
        assert_eq!(predicate.to_string(), "size (bytes) > 100000");
    }
}
