//! On-disk repository behavior.

use chrono::{Duration, Utc};
use jobscrape_core::{
    AggregatedRecord, ClassificationLabel, InsertOutcome, JobRecord, JobRepository, SiteKind,
};
use jobscrape_store::JobStore;
use tempfile::TempDir;

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("jobs.sqlite3");

    {
        let store = JobStore::open(&path).unwrap();
        let mut job = JobRecord::new(SiteKind::Costagroup, "https://example.com/costa/1");
        job.description = Some("Harvest team member".to_string());
        assert_eq!(store.insert(&job).unwrap(), InsertOutcome::Inserted);
    }

    let store = JobStore::open(&path).unwrap();
    assert!(
        store
            .exists_by_url(SiteKind::Costagroup, "https://example.com/costa/1")
            .unwrap()
    );
    assert_eq!(store.count(SiteKind::Costagroup).unwrap(), 1);
}

#[test]
fn test_same_url_is_distinct_per_site() {
    let store = JobStore::open_in_memory().unwrap();
    let url = "https://example.com/shared";

    let a = JobRecord::new(SiteKind::Agrilabour, url);
    let b = JobRecord::new(SiteKind::Apgworkforce, url);

    assert_eq!(store.insert(&a).unwrap(), InsertOutcome::Inserted);
    assert_eq!(store.insert(&b).unwrap(), InsertOutcome::Inserted);
}

#[test]
fn test_unset_label_round_trips() {
    let store = JobStore::open_in_memory().unwrap();
    let job = JobRecord::new(SiteKind::Agrilabour, "https://example.com/u");
    store.insert(&job).unwrap();

    store
        .update_label(SiteKind::Agrilabour, &job.url, ClassificationLabel::Error)
        .unwrap();
    assert_eq!(
        store.all(SiteKind::Agrilabour).unwrap()[0].label,
        ClassificationLabel::Error
    );

    store
        .update_label(SiteKind::Agrilabour, &job.url, ClassificationLabel::Unset)
        .unwrap();
    assert_eq!(
        store.all(SiteKind::Agrilabour).unwrap()[0].label,
        ClassificationLabel::Unset
    );
}

#[test]
fn test_aggregated_rebuild_feeds_recent_table() {
    let store = JobStore::open_in_memory().unwrap();
    let now = Utc::now();

    let mut fresh = JobRecord::new(SiteKind::Agrilabour, "https://example.com/b");
    fresh.discovered_at = now - Duration::days(1);
    let mut fresher = JobRecord::new(SiteKind::Costagroup, "https://example.com/a");
    fresher.discovered_at = now - Duration::days(1);
    let mut stale = JobRecord::new(SiteKind::Agrilabour, "https://example.com/old");
    stale.discovered_at = now - Duration::days(30);

    let records: Vec<_> = [&fresh, &fresher, &stale]
        .into_iter()
        .map(AggregatedRecord::from_job)
        .collect();
    store.replace_aggregated(&records).unwrap();

    let table = AggregatedRecord::recent_table(&store.aggregated().unwrap(), now, Duration::days(7));
    assert_eq!(table.len(), 2);
    let url_col = AggregatedRecord::COLUMNS
        .iter()
        .position(|c| *c == "url")
        .unwrap();
    assert_eq!(table.rows[0][url_col], "https://example.com/a");
    assert_eq!(table.rows[1][url_col], "https://example.com/b");
}
