//! Integration tests for bundle assembly and written report files.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use seo_model::{Column, PageRecord, Partition, Value};
use seo_report::{
    BUNDLE_SHEETS, DashboardStatus, ReportError, SectionToggles, WORKBOOK_FILE, build_bundle,
    chart_data_file, chart_image_file, read_workbook, write_dashboard, write_reports,
    write_workbook,
};
use seo_rules::{Predicate, RuleCatalog, RuleEngine, RuleSpec, Thresholds, ids};
use seo_transform::{NormalizeOptions, PipelineRun, normalize_records};

/// Text of the `<p>` following a card's `<h4>` label.
fn card<'a>(html: &'a str, label: &str) -> Option<&'a str> {
    let heading = format!("<h4>{label}</h4>");
    let rest = &html[html.find(&heading)? + heading.len()..];
    let value = &rest[rest.find("<p>")? + 3..];
    Some(&value[..value.find("</p>")?])
}

fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date")
}

fn page(address: &str, status: f64, response_time: f64, title_length: f64) -> PageRecord {
    let mut record = PageRecord::new(address);
    record.content_type = Some("text/html; charset=utf-8".to_string());
    record.status_code = Some(status);
    record.response_time = Some(response_time);
    record.title_length = Some(title_length);
    record
}

fn sample_pages() -> Vec<PageRecord> {
    let mut a = page("https://example.com/a", 200.0, 0.3, 55.0);
    a.title = Some("Home".to_string());
    a.canonical_link = Some("https://example.com/a".to_string());
    a.indexability = Some("Indexable".to_string());
    a.last_modified = NaiveDate::from_ymd_opt(2023, 1, 15).and_then(|d| d.and_hms_opt(8, 30, 0));
    let mut b = page("https://example.com/b", 404.0, 0.8, 45.0);
    b.title = Some("Home".to_string());
    b.indexability = Some("Non-Indexable".to_string());
    b.indexability_status = Some("Non-Indexable: Client Error".to_string());
    b.canonical_link = Some("https://example.com/b".to_string());
    let mut c = page("https://example.com/c", 200.0, 0.2, 65.0);
    c.title = Some("Tom & Jerry <classic>".to_string());
    c.indexability = Some("Indexable".to_string());
    vec![a, b, c]
}

fn pipeline(pages: Vec<PageRecord>) -> PipelineRun {
    PipelineRun::new(normalize_records(pages, &NormalizeOptions::default()), run_at())
}

fn engine() -> RuleEngine {
    RuleEngine::new(RuleCatalog::standard(&Thresholds::default()).expect("catalog"))
}

fn sheet_addresses(bundle: &seo_model::OutputBundle, name: &str) -> Vec<String> {
    let sheet = bundle.sheet(name).expect("sheet");
    sheet
        .table
        .rows
        .iter()
        .map(|row| row[0].to_string())
        .collect()
}

#[test]
fn bundle_has_every_sheet_in_order() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let bundle = build_bundle(&results).expect("bundle");

    let names: Vec<&str> = bundle.sheet_names().collect();
    let expected: Vec<&str> = BUNDLE_SHEETS.iter().map(|spec| spec.name).collect();
    assert_eq!(names, expected);
    assert_eq!(names.len(), 14);

    assert_eq!(sheet_addresses(&bundle, "4xx Errors"), ["https://example.com/b"]);
    assert_eq!(sheet_addresses(&bundle, "Slow Pages"), ["https://example.com/b"]);
    assert_eq!(
        sheet_addresses(&bundle, "Suboptimal Titles"),
        ["https://example.com/b", "https://example.com/c"]
    );
    assert_eq!(
        bundle.sheet("Slow Pages").expect("slow").table.columns,
        ["address", "response time"]
    );
    assert_eq!(bundle.row_count("HTML Pages"), Some(run.partition_len(Partition::Html)));
}

#[test]
fn bundle_fails_when_a_rule_is_absent() {
    let catalog = RuleCatalog::builder()
        .rule(RuleSpec::filter(
            ids::HTML_PAGES,
            "HTML Pages",
            Partition::Html,
            Predicate::Always,
        ))
        .build()
        .expect("catalog");
    let engine = RuleEngine::new(catalog);
    let run = pipeline(sample_pages());
    let results = engine.execute(&run);

    let err = build_bundle(&results).expect_err("missing rule");
    assert!(
        matches!(&err, ReportError::MissingRule { sheet, rule } if sheet == "4xx Errors" && rule == ids::CLIENT_ERRORS),
        "{err}"
    );
}

#[test]
fn workbook_round_trips() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let bundle = build_bundle(&results).expect("bundle");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(WORKBOOK_FILE);
    write_workbook(&bundle, &path).expect("write workbook");
    let read = read_workbook(&path).expect("read workbook");
    assert_eq!(read, bundle);

    let titles = read.sheet("Suboptimal Titles").expect("titles");
    assert_eq!(titles.table.rows[1][1], Value::Text("Tom & Jerry <classic>".to_string()));
    let canonical = read.sheet("Missing Canonical").expect("canonical");
    assert_eq!(
        canonical.table.rows,
        vec![vec![
            Value::Text("https://example.com/c".to_string()),
            Value::Text("Indexable".to_string())
        ]]
    );
}

#[test]
fn identical_runs_write_identical_workbooks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut written = Vec::new();
    for name in ["first.xml", "second.xml"] {
        let run = pipeline(sample_pages());
        let engine = engine();
        let results = engine.execute(&run);
        let bundle = build_bundle(&results).expect("bundle");
        let path = dir.path().join(name);
        write_workbook(&bundle, &path).expect("write");
        written.push(fs::read(&path).expect("read"));
    }
    assert_eq!(written[0], written[1]);
}

#[test]
fn failed_workbook_write_leaves_nothing_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join(WORKBOOK_FILE);
    fs::create_dir(&target).expect("occupy target with a directory");

    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let bundle = build_bundle(&results).expect("bundle");

    assert!(write_workbook(&bundle, &target).is_err());
    let entries: Vec<_> = fs::read_dir(dir.path())
        .expect("list")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name())
        .collect();
    assert_eq!(entries, [std::ffi::OsString::from(WORKBOOK_FILE)]);
    assert!(target.is_dir());
}

#[test]
fn write_reports_produces_all_files() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");

    let outputs = write_reports(&run, &results, dir.path()).expect("reports");
    for file in [
        "cleaned_data.csv",
        "slow_pages.csv",
        "non_indexable.csv",
        "missing_canonical.csv",
        "suboptimal_titles.csv",
        "suboptimal_metas.csv",
        "duplicate_titles.csv",
        "thin_pages.csv",
        "low_readability.csv",
        "near_duplicates.csv",
        "deep_pages.csv",
        "low_inlinks.csv",
        "large_pages.csv",
        "outdated_pages.csv",
        "old_http_pages.csv",
        "status_codes.csv",
        "client_errors.csv",
        "summary.json",
        "status_codes.json",
        "indexability.json",
        "title_lengths.json",
        "meta_lengths.json",
        "content_quality.json",
        "link_correlations.json",
        "page_size.json",
        "audit_report.xml",
    ] {
        assert!(dir.path().join(file).is_file(), "{file} missing");
    }
    assert_eq!(outputs.summary.total_urls, 3);
    assert_eq!(outputs.summary.avg_response_time.map(|v| (v * 1000.0).round()), Some(433.0));

    let status = fs::read_to_string(dir.path().join("status_codes.csv")).expect("status csv");
    assert_eq!(status, "status code,count\n200,2\n404,1\n");

    let duplicates = fs::read_to_string(dir.path().join("duplicate_titles.csv")).expect("dups");
    assert_eq!(
        duplicates,
        "title 1,address\nHome,https://example.com/a; https://example.com/b\n"
    );

    let cleaned = fs::read_to_string(dir.path().join("cleaned_data.csv")).expect("cleaned");
    let header = cleaned.lines().next().expect("header");
    let expected: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    assert_eq!(header, expected.join(","));
    assert_eq!(cleaned.lines().count(), 4);
}

#[test]
fn dashboard_reads_written_reports() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");
    write_reports(&run, &results, dir.path()).expect("reports");

    let output = dir.path().join("dashboard.html");
    let status = write_dashboard(dir.path(), &output, &SectionToggles::default()).expect("dashboard");
    assert_eq!(status, DashboardStatus::Rendered);

    let html = fs::read_to_string(&output).expect("html");
    assert_eq!(card(&html, "Non-Indexable Pages"), Some("1"));
    assert_eq!(card(&html, "Missing Canonical"), Some("1"));
    assert_eq!(card(&html, "4xx Errors"), Some("1"));
    assert_eq!(card(&html, "Suboptimal Titles"), Some("2"));
    assert!(html.contains("Tom &amp; Jerry &lt;classic&gt;"));
    assert!(html.contains("<img src=\"status_codes.svg\""));
    assert!(html.contains("<a href=\"client_errors.csv\""));
    assert!(!html.contains("not found"));
}

#[test]
fn dashboard_cards_follow_distinct_rules() {
    let mut pages = sample_pages();
    pages[2].canonical_link = Some("https://example.com/c".to_string());
    pages.push(PageRecord::new("https://example.com/feed.xml"));
    pages.push(PageRecord::new("https://example.com/sitemap.xml"));
    let run = pipeline(pages);
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");
    write_reports(&run, &results, dir.path()).expect("reports");

    let output = dir.path().join("dashboard.html");
    write_dashboard(dir.path(), &output, &SectionToggles::default()).expect("dashboard");
    let html = fs::read_to_string(&output).expect("html");
    assert_eq!(card(&html, "Non-Indexable Pages"), Some("1"));
    assert_eq!(card(&html, "Missing Canonical"), Some("2"));
}

#[test]
fn dashboard_without_workbook_writes_error_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out").join("dashboard.html");
    let status = write_dashboard(dir.path(), &output, &SectionToggles::default()).expect("fallback");
    assert_eq!(status, DashboardStatus::ErrorNotice);
    let html = fs::read_to_string(&output).expect("html");
    assert!(html.contains("Error: Missing data files."));
    assert!(html.contains(WORKBOOK_FILE));
}

#[test]
fn dashboard_reports_missing_chart_inside_section() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");
    write_reports(&run, &results, dir.path()).expect("reports");
    fs::remove_file(dir.path().join("page_size.svg")).expect("remove chart");

    let output = dir.path().join("dashboard.html");
    let status = write_dashboard(dir.path(), &output, &SectionToggles::default()).expect("dashboard");
    assert_eq!(status, DashboardStatus::Rendered);
    let html = fs::read_to_string(&output).expect("html");
    assert!(html.contains("Chart image page_size.svg not found."));
    assert!(html.contains("<img src=\"status_codes.svg\""));
}

#[test]
fn dashboard_with_corrupt_workbook_writes_error_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(WORKBOOK_FILE), "<Workbook><Worksheet>").expect("write workbook");

    let output = dir.path().join("dashboard.html");
    let status = write_dashboard(dir.path(), &output, &SectionToggles::default()).expect("fallback");
    assert_eq!(status, DashboardStatus::ErrorNotice);
    let html = fs::read_to_string(&output).expect("html");
    assert!(html.contains("<h1>Error: Unreadable data files.</h1>"));
    assert!(html.contains(WORKBOOK_FILE));
}

#[test]
fn dashboard_outside_reports_dir_links_absolute_assets() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");
    let reports = dir.path().join("reports");
    write_reports(&run, &results, &reports).expect("reports");

    let output = dir.path().join("site").join("index.html");
    write_dashboard(&reports, &output, &SectionToggles::default()).expect("dashboard");
    let html = fs::read_to_string(&output).expect("html");
    let prefix = fs::canonicalize(&reports).expect("canonical");
    let expected = format!("src=\"{}/status_codes.svg\"", prefix.display());
    assert!(html.contains(&expected));
}

#[test]
fn chart_images_are_written_next_to_chart_data() {
    let run = pipeline(sample_pages());
    let engine = engine();
    let results = engine.execute(&run);
    let dir = tempfile::tempdir().expect("tempdir");
    let outputs = write_reports(&run, &results, dir.path()).expect("reports");

    for stem in [
        "status_codes",
        "indexability",
        "title_lengths",
        "meta_lengths",
        "content_quality",
        "link_correlations",
        "page_size",
    ] {
        let data = dir.path().join(chart_data_file(stem));
        let image = dir.path().join(chart_image_file(stem));
        assert!(data.is_file(), "{stem} data missing");
        let svg = fs::read_to_string(&image).expect("chart image");
        assert!(svg.starts_with("<svg"), "{stem} is not an SVG document");
        assert!(outputs.charts.contains(&image));
    }
    let status = fs::read_to_string(dir.path().join("status_codes.svg")).expect("status svg");
    assert!(status.contains("Status Code Distribution"));
}
