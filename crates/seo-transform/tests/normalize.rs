//! Integration tests for the normalizer.

use std::path::Path;

use proptest::prelude::*;
use seo_ingest::{CrawlExport, RawTable, validate_schema};
use seo_model::{Column, Partition};
use seo_transform::{NormalizeOptions, normalize_export};

fn export(rows: &[Vec<(Column, &str)>]) -> CrawlExport {
    let headers: Vec<String> = Column::ALL
        .iter()
        .map(|column| column.header().to_string())
        .collect();
    let rows = rows
        .iter()
        .map(|cells| {
            Column::ALL
                .iter()
                .map(|column| {
                    cells
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, value)| (*value).to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    let table = RawTable { headers, rows };
    let path = Path::new("crawl.csv");
    let schema = validate_schema(&table, path).expect("valid schema");
    CrawlExport {
        source: path.to_path_buf(),
        table,
        schema,
    }
}

#[test]
fn coerces_status_and_timestamp_leniently() {
    let export = export(&[
        vec![
            (Column::Address, "https://example.com/a"),
            (Column::StatusCode, "404"),
            (Column::LastModified, "Tue, 05 Mar 2024 10:00:00 GMT"),
        ],
        vec![
            (Column::Address, "https://example.com/b"),
            (Column::StatusCode, "blocked"),
            (Column::LastModified, "last week"),
        ],
    ]);

    let crawl = normalize_export(&export, &NormalizeOptions::default());

    assert_eq!(crawl.pages()[0].status_code, Some(404.0));
    assert!(crawl.pages()[0].last_modified.is_some());
    assert_eq!(crawl.pages()[1].status_code, None);
    assert_eq!(crawl.pages()[1].last_modified, None);
    assert_eq!(crawl.stats.coerced_to_missing.get(&Column::StatusCode), Some(&1));
    assert_eq!(crawl.stats.coerced_to_missing.get(&Column::LastModified), Some(&1));
}

#[test]
fn title_and_meta_lengths_default_to_zero() {
    let export = export(&[vec![
        (Column::Address, "https://example.com/"),
        (Column::WordCount, ""),
    ]]);

    let crawl = normalize_export(&export, &NormalizeOptions::default());

    let page = &crawl.pages()[0];
    assert_eq!(page.title_length, Some(0.0));
    assert_eq!(page.meta_description_length, Some(0.0));
    assert_eq!(page.word_count, None);
    assert_eq!(crawl.stats.defaulted.get(&Column::TitleLength), Some(&1));
}

#[test]
fn duplicates_and_keyless_rows_are_dropped() {
    let export = export(&[
        vec![(Column::Address, "https://example.com/"), (Column::Title, "First")],
        vec![(Column::Address, ""), (Column::Title, "Orphan")],
        vec![(Column::Address, "https://example.com/"), (Column::Title, "Second")],
    ]);

    let crawl = normalize_export(&export, &NormalizeOptions::default());

    assert_eq!(crawl.pages().len(), 1);
    assert_eq!(crawl.pages()[0].title.as_deref(), Some("First"));
    assert_eq!(crawl.stats.input_rows, 3);
    assert_eq!(crawl.stats.duplicate_rows, 1);
    assert_eq!(crawl.stats.keyless_rows, 1);
}

#[test]
fn html_partition_uses_case_sensitive_marker() {
    let export = export(&[
        vec![
            (Column::Address, "https://example.com/"),
            (Column::ContentType, "text/html; charset=UTF-8"),
        ],
        vec![
            (Column::Address, "https://example.com/app.js"),
            (Column::ContentType, "application/javascript"),
        ],
        vec![
            (Column::Address, "https://example.com/shout"),
            (Column::ContentType, "TEXT/HTML"),
        ],
        vec![(Column::Address, "https://example.com/unknown")],
    ]);

    let crawl = normalize_export(&export, &NormalizeOptions::default());

    let html: Vec<&str> = crawl
        .rows(Partition::Html)
        .iter()
        .map(|page| page.address.as_str())
        .collect();
    assert_eq!(html, vec!["https://example.com/"]);
    assert_eq!(crawl.partition_len(Partition::All), 4);
}

proptest! {
    #[test]
    fn normalized_addresses_are_unique(
        keys in proptest::collection::vec(0u8..6, 0..40),
        html in proptest::collection::vec(any::<bool>(), 40),
    ) {
        let addresses: Vec<String> = keys
            .iter()
            .map(|key| format!("https://example.com/{key}"))
            .collect();
        let rows: Vec<Vec<(Column, &str)>> = addresses
            .iter()
            .zip(&html)
            .map(|(address, is_html)| {
                let content_type = if *is_html { "text/html" } else { "image/png" };
                vec![(Column::Address, address.as_str()), (Column::ContentType, content_type)]
            })
            .collect();
        let crawl = normalize_export(&export(&rows), &NormalizeOptions::default());

        let mut seen = std::collections::BTreeSet::new();
        for page in crawl.pages() {
            prop_assert!(seen.insert(page.address.clone()));
        }
        prop_assert_eq!(crawl.pages().len() + crawl.stats.duplicate_rows, rows.len());
        for page in crawl.rows(Partition::Html) {
            prop_assert!(crawl.pages().iter().any(|p| p.address == page.address));
            prop_assert!(page.is_html("text/html"));
        }
        let html_pages = crawl.pages().iter().filter(|page| page.is_html("text/html")).count();
        prop_assert_eq!(crawl.partition_len(Partition::Html), html_pages);
    }
}
