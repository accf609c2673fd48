//! Integration tests for the rule engine over normalized crawls.

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use seo_model::{PageRecord, Partition};
use seo_rules::{
    AuditConfig, DuplicateGroup, RuleCatalog, RuleEngine, RuleError, RuleOutput, Thresholds, ids,
};
use seo_transform::{NormalizeOptions, PipelineRun, normalize_records};

fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date")
}

fn html(address: &str) -> PageRecord {
    let mut record = PageRecord::new(address);
    record.content_type = Some("text/html; charset=utf-8".to_string());
    record
}

fn pipeline(pages: Vec<PageRecord>) -> PipelineRun {
    PipelineRun::new(normalize_records(pages, &NormalizeOptions::default()), run_at())
}

fn standard_engine() -> RuleEngine {
    RuleEngine::new(RuleCatalog::standard(&Thresholds::default()).expect("standard catalog"))
}

fn addresses(engine_run: &seo_rules::RuleResults<'_>, id: &str) -> Vec<String> {
    engine_run
        .get(id)
        .and_then(|result| result.rows())
        .expect("row rule")
        .iter()
        .map(|record| record.address.clone())
        .collect()
}

fn three_pages() -> Vec<PageRecord> {
    let specs = [
        ("https://example.com/a", 200.0, 0.3, 55.0),
        ("https://example.com/b", 404.0, 0.8, 45.0),
        ("https://example.com/c", 200.0, 0.2, 65.0),
    ];
    specs
        .into_iter()
        .map(|(address, status, response_time, title_length)| {
            let mut record = html(address);
            record.status_code = Some(status);
            record.response_time = Some(response_time);
            record.title_length = Some(title_length);
            record
        })
        .collect()
}

#[test]
fn three_row_scenario() {
    let run = pipeline(three_pages());
    let engine = standard_engine();
    let results = engine.execute(&run);

    assert_eq!(addresses(&results, ids::SLOW_PAGES), ["https://example.com/b"]);
    assert_eq!(
        addresses(&results, ids::SUBOPTIMAL_TITLES),
        ["https://example.com/b", "https://example.com/c"]
    );
    assert_eq!(addresses(&results, ids::CLIENT_ERRORS), ["https://example.com/b"]);
    assert_eq!(results.len(), engine.catalog().len());
}

#[test]
fn duplicate_titles_group_by_title() {
    let mut pages = Vec::new();
    for (address, title) in [
        ("https://example.com/", "Home"),
        ("https://example.com/index", "Home"),
        ("https://example.com/about", "About us"),
    ] {
        let mut record = html(address);
        record.title = Some(title.to_string());
        pages.push(record);
    }
    let run = pipeline(pages);
    let engine = standard_engine();
    let results = engine.execute(&run);

    let result = results.get(ids::DUPLICATE_TITLES).expect("duplicate titles");
    assert_eq!(
        result.output,
        RuleOutput::Groups(vec![DuplicateGroup {
            key: "Home".to_string(),
            members: vec![
                "https://example.com/".to_string(),
                "https://example.com/index".to_string()
            ],
        }])
    );
    let table = result.to_table();
    assert_eq!(table.columns, ["title 1", "address"]);
    assert_eq!(
        table.rows[0][1].to_string(),
        "https://example.com/; https://example.com/index"
    );
}

#[test]
fn duplicate_titles_ignore_non_html_rows() {
    let mut pdf = PageRecord::new("https://example.com/home.pdf");
    pdf.content_type = Some("application/pdf".to_string());
    pdf.title = Some("Home".to_string());
    let mut page = html("https://example.com/");
    page.title = Some("Home".to_string());

    let run = pipeline(vec![pdf, page]);
    let engine = standard_engine();
    let results = engine.execute(&run);
    assert!(results.get(ids::DUPLICATE_TITLES).expect("rule").is_empty());
}

#[test]
fn missing_and_empty_canonical_differ() {
    let mut empty = html("https://example.com/empty");
    empty.canonical_link = Some(String::new());
    let missing = html("https://example.com/missing");
    let mut present = html("https://example.com/present");
    present.canonical_link = Some("https://example.com/present".to_string());

    let run = pipeline(vec![empty, missing, present]);
    let engine = standard_engine();
    let results = engine.execute(&run);
    assert_eq!(
        addresses(&results, ids::MISSING_CANONICAL),
        ["https://example.com/missing"]
    );
}

#[test]
fn non_indexable_is_independent_of_canonical() {
    let mut blocked = html("https://example.com/blocked");
    blocked.indexability_status = Some("Non-Indexable: noindex".to_string());
    blocked.canonical_link = Some("https://example.com/blocked".to_string());
    let canonicalised = html("https://example.com/open");

    let run = pipeline(vec![blocked, canonicalised]);
    let engine = standard_engine();
    let results = engine.execute(&run);
    assert_eq!(
        addresses(&results, ids::NON_INDEXABLE),
        ["https://example.com/blocked"]
    );
    assert_eq!(
        addresses(&results, ids::MISSING_CANONICAL),
        ["https://example.com/open"]
    );
}

#[test]
fn status_distribution_counts_every_partition_row() {
    let mut pages = three_pages();
    let mut image = PageRecord::new("https://example.com/logo.png");
    image.content_type = Some("image/png".to_string());
    image.status_code = Some(200.0);
    pages.push(image);

    let run = pipeline(pages);
    let engine = standard_engine();
    let results = engine.execute(&run);
    let table = results
        .get(ids::STATUS_DISTRIBUTION)
        .expect("status distribution")
        .to_table();
    assert_eq!(table.columns, ["status code", "count"]);
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    assert_eq!(rendered, [["200", "3"], ["404", "1"]]);
}

#[test]
fn low_inlinks_sorted_by_link_score_with_missing_last() {
    let mut pages = Vec::new();
    for (address, score) in [("a", Some(7.0)), ("b", None), ("c", Some(1.0)), ("d", Some(7.0))] {
        let mut record = PageRecord::new(format!("https://example.com/{address}"));
        record.inlinks = Some(1.0);
        record.link_score = score;
        pages.push(record);
    }
    let run = pipeline(pages);
    let engine = standard_engine();
    let results = engine.execute(&run);
    assert_eq!(
        addresses(&results, ids::LOW_INLINKS),
        [
            "https://example.com/c",
            "https://example.com/a",
            "https://example.com/d",
            "https://example.com/b"
        ]
    );
}

#[test]
fn outdated_pages_follow_configured_age() {
    let mut old = PageRecord::new("https://example.com/old");
    old.last_modified = NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let fresh = PageRecord::new("https://example.com/undated");

    let thresholds = Thresholds {
        outdated_days: 30,
        ..Thresholds::default()
    };
    let engine = RuleEngine::new(RuleCatalog::standard(&thresholds).expect("catalog"));
    let run = pipeline(vec![old.clone(), fresh.clone()]);
    let results = engine.execute(&run);
    assert_eq!(
        addresses(&results, ids::OUTDATED_PAGES),
        ["https://example.com/old"]
    );

    let default_run = pipeline(vec![old, fresh]);
    let default_engine = standard_engine();
    let default_results = default_engine.execute(&default_run);
    assert!(default_results.get(ids::OUTDATED_PAGES).expect("rule").is_empty());
}

#[test]
fn config_file_overrides_thresholds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.toml");
    std::fs::write(&path, "[thresholds]\nslow_response_secs = 0.25\n").expect("write config");

    let config = AuditConfig::load(&path).expect("load config");
    assert_eq!(config.thresholds.slow_response_secs, 0.25);
    assert_eq!(config.thresholds.title_length_max, 60.0);

    let engine = RuleEngine::new(RuleCatalog::standard(&config.thresholds).expect("catalog"));
    let run = pipeline(three_pages());
    let results = engine.execute(&run);
    assert_eq!(
        addresses(&results, ids::SLOW_PAGES),
        ["https://example.com/a", "https://example.com/b"]
    );
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.toml");
    std::fs::write(&path, "[thresholds]\ntitle_length_min = 70\n").expect("write config");
    let err = AuditConfig::load(&path).expect_err("min above max");
    assert!(matches!(err, RuleError::InvalidThreshold { .. }));

    std::fs::write(&path, "[thresholds]\nslow_secs = 1\n").expect("write config");
    let err = AuditConfig::load(&path).expect_err("unknown key");
    assert!(matches!(err, RuleError::ConfigParse { .. }));
}

#[test]
fn catalog_listing() {
    let catalog = RuleCatalog::standard(&Thresholds::default()).expect("catalog");
    let listing = catalog
        .rules()
        .iter()
        .map(|rule| format!("{} [{}] {}", rule.id, rule.partition, rule.describe()))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(listing, @r#"
    status_distribution [all] count by status code
    slow_pages [all] response time > 0.5
    non_indexable [all] indexability status contains "Non-Indexable"
    missing_canonical [all] canonical link element 1 is missing
    suboptimal_titles [html] title 1 length < 50 or > 60
    suboptimal_metas [html] meta description 1 length < 150 or > 160
    duplicate_titles [html] title 1 shared by 2+ rows
    thin_content [html] word count < 300
    low_readability [html] flesch reading ease score < 60
    near_duplicates [html] no. near duplicates > 0
    deep_pages [all] crawl depth > 3
    low_inlinks [all] inlinks < 5
    large_pages [all] size (bytes) > 100000
    outdated_pages [all] last modified older than 365 days
    http11_pages [all] http version = "1.1"
    html_pages [html] all rows
    client_errors [all] 400 <= status code <= 499
    "#);
}

fn arb_page() -> impl Strategy<Value = PageRecord> {
    (
        0usize..12,
        prop::option::of(prop_oneof![Just("text/html"), Just("image/png")]),
        prop::option::of(0.0f64..2.0),
        prop::option::of(0.0f64..120.0),
        prop::option::of(prop_oneof![Just("Home"), Just("About"), Just("Blog")]),
        prop::option::of(0.0f64..10.0),
    )
        .prop_map(|(slug, content_type, response_time, title_length, title, inlinks)| {
            let mut record = PageRecord::new(format!("https://example.com/{slug}"));
            record.content_type = content_type.map(str::to_string);
            record.response_time = response_time;
            record.title_length = title_length;
            record.title = title.map(str::to_string);
            record.inlinks = inlinks;
            record.link_score = inlinks;
            record
        })
}

proptest! {
    #[test]
    fn results_are_subsets_of_their_partition(pages in prop::collection::vec(arb_page(), 0..30)) {
        let run = pipeline(pages);
        let engine = standard_engine();
        let results = engine.execute(&run);
        for result in results.iter() {
            let partition = run.rows(result.spec.partition);
            if let Some(rows) = result.rows() {
                prop_assert!(rows.len() <= partition.len());
                for row in rows {
                    prop_assert!(partition.iter().any(|p| std::ptr::eq(*p, *row)));
                }
            }
        }
        let html_pages = results.get(ids::HTML_PAGES).expect("html pages");
        prop_assert_eq!(html_pages.len(), run.partition_len(Partition::Html));
    }

    #[test]
    fn evaluation_is_idempotent(pages in prop::collection::vec(arb_page(), 0..30)) {
        let engine = standard_engine();
        let first_run = pipeline(pages.clone());
        let second_run = pipeline(pages);
        let first = engine.execute(&first_run);
        let second = engine.execute(&second_run);
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(a.to_table(), b.to_table());
        }
    }
}
