//! Integration tests for record types.

use chrono::{Duration, TimeZone, Utc};
use jobscrape_core::{AggregatedRecord, ClassificationLabel, JobRecord, SiteKind, Table};

#[test]
fn test_job_row_formats_dates() {
    let mut job = JobRecord::new(SiteKind::WorkforceAustralia, "https://example.com/v/1");
    job.posted_at = Some(Utc.with_ymd_and_hms(2026, 2, 14, 23, 30, 0).unwrap());
    job.discovered_at = Utc.with_ymd_and_hms(2026, 2, 15, 1, 0, 0).unwrap();

    let row = job.to_row();
    assert_eq!(row[11], "2026-02-14");
    assert_eq!(row[12], "2026-02-15");
}

#[test]
fn test_table_values_start_with_header() {
    let mut table = Table::new(["a", "b"]);
    table.push_row(vec!["1".to_string()]);
    table.push_row(vec!["2".to_string(), "3".to_string(), "extra".to_string()]);

    let values = table.to_values();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0], vec!["a", "b"]);
    assert_eq!(values[1], vec!["1", ""]);
    assert_eq!(values[2], vec!["2", "3"]);
}

#[test]
fn test_recent_table_is_empty_when_everything_is_old() {
    let now = Utc::now();
    let mut job = JobRecord::new(SiteKind::Apgworkforce, "https://example.com/x");
    job.discovered_at = now - Duration::days(30);
    job.label = ClassificationLabel::No;

    let table =
        AggregatedRecord::recent_table(&[AggregatedRecord::from_job(&job)], now, Duration::days(7));
    assert!(table.is_empty());
    assert_eq!(table.to_values().len(), 1);
}
