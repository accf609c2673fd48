use std::collections::BTreeSet;

use seo_model::PageRecord;

/// Keeps the first record per address, preserving input order.
///
/// Returns the number of dropped duplicates.
pub fn dedupe_by_address(records: &mut Vec<PageRecord>) -> usize {
    let before = records.len();
    let mut seen = BTreeSet::new();
    records.retain(|record| seen.insert(record.address.clone()));
    before - records.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut first = PageRecord::new("https://example.com/a");
        first.word_count = Some(100.0);
        let mut second = PageRecord::new("https://example.com/a");
        second.word_count = Some(900.0);
        let mut records = vec![first, PageRecord::new("https://example.com/b"), second];

        let dropped = dedupe_by_address(&mut records);

        assert_eq!(dropped, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].word_count, Some(100.0));
        assert_eq!(records[1].address, "https://example.com/b");
    }
}
