//! Summary statistics and chart data.
//!
//! Every chart is written twice under one file stem: the plain data as JSON
//! and the drawn image as SVG (see [`crate::charts`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use seo_model::{Column, PageRecord, Partition, Value};
use seo_rules::{RuleOutput, RuleResults, ids};
use seo_transform::PipelineRun;
use tracing::{debug, info};

use crate::charts::write_chart_image;
use crate::error::{ReportError, Result};

pub const SUMMARY_FILE: &str = "summary.json";

// Chart file stems.
pub const STATUS_CODES_CHART: &str = "status_codes";
pub const INDEXABILITY_CHART: &str = "indexability";
pub const TITLE_LENGTHS_CHART: &str = "title_lengths";
pub const META_LENGTHS_CHART: &str = "meta_lengths";
pub const CONTENT_QUALITY_CHART: &str = "content_quality";
pub const LINK_CORRELATIONS_CHART: &str = "link_correlations";
pub const PAGE_SIZE_CHART: &str = "page_size";

pub const HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCount {
    pub id: String,
    pub name: String,
    pub matched: usize,
}

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_urls: usize,
    pub html_urls: usize,
    /// Mean response time over rows that have one.
    pub avg_response_time: Option<f64>,
    pub input_rows: usize,
    pub duplicate_rows: usize,
    pub keyless_rows: usize,
    pub coerced_cells: usize,
    pub rules: Vec<RuleCount>,
}

impl SummaryStats {
    pub fn compute(run: &PipelineRun, results: &RuleResults<'_>) -> Self {
        let stats = run.stats();
        Self {
            total_urls: run.partition_len(Partition::All),
            html_urls: run.partition_len(Partition::Html),
            avg_response_time: mean(run.pages().iter().filter_map(|p| p.response_time)),
            input_rows: stats.input_rows,
            duplicate_rows: stats.duplicate_rows,
            keyless_rows: stats.keyless_rows,
            coerced_cells: stats.coerced_total(),
            rules: results
                .counts()
                .into_iter()
                .map(|(id, name, matched)| RuleCount {
                    id: id.to_string(),
                    name: name.to_string(),
                    matched,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        title: String,
        x_label: String,
        bars: Vec<Bar>,
    },
    Histogram {
        title: String,
        x_label: String,
        bins: Vec<HistogramBin>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<[f64; 2]>,
    },
    Correlation {
        title: String,
        columns: Vec<String>,
        /// Pearson coefficients; `None` where undefined.
        matrix: Vec<Vec<Option<f64>>>,
    },
    BoxPlot {
        title: String,
        y_label: String,
        groups: Vec<BoxStats>,
    },
}

impl ChartData {
    pub fn title(&self) -> &str {
        match self {
            Self::Bar { title, .. }
            | Self::Histogram { title, .. }
            | Self::Scatter { title, .. }
            | Self::Correlation { title, .. }
            | Self::BoxPlot { title, .. } => title,
        }
    }
}

pub fn chart_data_file(stem: &str) -> String {
    format!("{stem}.json")
}

pub fn chart_image_file(stem: &str) -> String {
    format!("{stem}.svg")
}

/// Every chart of a run keyed by its file stem.
pub fn compute_charts(run: &PipelineRun, results: &RuleResults<'_>) -> Vec<(&'static str, ChartData)> {
    let all = run.rows(Partition::All);
    let html = run.rows(Partition::Html);

    let status_bars = match results.get(ids::STATUS_DISTRIBUTION).map(|r| &r.output) {
        Some(RuleOutput::Counts(counts)) => counts
            .iter()
            .map(|entry| Bar {
                label: entry.value.to_string(),
                count: entry.count,
            })
            .collect(),
        _ => count_values(&all, Column::StatusCode),
    };

    vec![
        (
            STATUS_CODES_CHART,
            ChartData::Bar {
                title: "Status Code Distribution".into(),
                x_label: Column::StatusCode.header().into(),
                bars: status_bars,
            },
        ),
        (
            INDEXABILITY_CHART,
            ChartData::Bar {
                title: "Indexability Status".into(),
                x_label: Column::Indexability.header().into(),
                bars: count_values(&all, Column::Indexability),
            },
        ),
        (
            TITLE_LENGTHS_CHART,
            ChartData::Histogram {
                title: "Title Length Distribution".into(),
                x_label: Column::TitleLength.header().into(),
                bins: histogram(&numbers(&html, Column::TitleLength), HISTOGRAM_BINS),
            },
        ),
        (
            META_LENGTHS_CHART,
            ChartData::Histogram {
                title: "Meta Description Length Distribution".into(),
                x_label: Column::MetaDescriptionLength.header().into(),
                bins: histogram(&numbers(&html, Column::MetaDescriptionLength), HISTOGRAM_BINS),
            },
        ),
        (
            CONTENT_QUALITY_CHART,
            ChartData::Scatter {
                title: "Content Quality: Word Count vs Readability".into(),
                x_label: Column::WordCount.header().into(),
                y_label: Column::FleschScore.header().into(),
                points: html
                    .iter()
                    .filter_map(|p| Some([p.word_count?, p.flesch_score?]))
                    .collect(),
            },
        ),
        (
            LINK_CORRELATIONS_CHART,
            correlation_chart(&all, &[Column::CrawlDepth, Column::Inlinks, Column::Outlinks]),
        ),
        (
            PAGE_SIZE_CHART,
            ChartData::BoxPlot {
                title: "Page Size by Content Type".into(),
                y_label: Column::SizeBytes.header().into(),
                groups: box_stats_by(&all, Column::ContentType, Column::SizeBytes),
            },
        ),
    ]
}

/// Writes the summary, every chart as JSON, and every chart image as SVG
/// into `dir`.
pub fn write_chart_data(
    run: &PipelineRun,
    results: &RuleResults<'_>,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ReportError::io(dir, source))?;
    let mut written = Vec::new();

    let summary_path = dir.join(SUMMARY_FILE);
    write_json(&SummaryStats::compute(run, results), &summary_path)?;
    written.push(summary_path);

    for (stem, chart) in compute_charts(run, results) {
        let data_path = dir.join(chart_data_file(stem));
        write_json(&chart, &data_path)?;
        written.push(data_path);

        let image_path = dir.join(chart_image_file(stem));
        write_chart_image(&chart, &image_path)?;
        debug!(path = %image_path.display(), "chart image written");
        written.push(image_path);
    }
    info!(file_count = written.len(), "chart data written");
    Ok(written)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ReportError::io(path, source))
}

fn numbers(rows: &[&PageRecord], column: Column) -> Vec<f64> {
    rows.iter().filter_map(|row| row.number(column)).collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Count per distinct value, descending, ties by value. Missing excluded.
fn count_values(rows: &[&PageRecord], column: Column) -> Vec<Bar> {
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for row in rows {
        let value = row.value(column);
        if value.is_missing() {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.sort_cmp(&b.0)));
    counts
        .into_iter()
        .map(|(value, count)| Bar {
            label: value.to_string(),
            count,
        })
        .collect()
}

/// Equal-width bins over `[min, max]`, the last bin closed on the right.
/// A single distinct value is centered in a unit-wide range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for value in values {
        let idx = (((value - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Pearson correlation over pairwise-complete observations.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn correlation_chart(rows: &[&PageRecord], columns: &[Column]) -> ChartData {
    let matrix = columns
        .iter()
        .map(|a| {
            columns
                .iter()
                .map(|b| {
                    let pairs: Vec<(f64, f64)> = rows
                        .iter()
                        .filter_map(|row| Some((row.number(*a)?, row.number(*b)?)))
                        .collect();
                    pearson(&pairs)
                })
                .collect()
        })
        .collect();
    ChartData::Correlation {
        title: "Correlation: Crawl Depth, Inlinks, Outlinks".into(),
        columns: columns.iter().map(|c| c.header().to_string()).collect(),
        matrix,
    }
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

fn box_stats_by(rows: &[&PageRecord], group: Column, measure: Column) -> Vec<BoxStats> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let (Some(label), Some(value)) = (row.text(group), row.number(measure)) {
            groups.entry(label.to_string()).or_default().push(value);
        }
    }
    groups
        .into_iter()
        .filter_map(|(label, mut values)| {
            values.sort_by(f64::total_cmp);
            Some(BoxStats {
                count: values.len(),
                min: *values.first()?,
                q1: quantile(&values, 0.25)?,
                median: quantile(&values, 0.5)?,
                q3: quantile(&values, 0.75)?,
                max: *values.last()?,
                label,
            })
        })
        .collect()
}
