//! Cross-site aggregated records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::job::{ClassificationLabel, JobRecord};
use super::table::{Table, format_date};

/// Projection of a [`JobRecord`] into the shape shared by all sites.
///
/// Rebuilt from job records on every run; `url` is unique across sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    /// When the record was extracted.
    pub publication_date: DateTime<Utc>,
    /// Job title.
    pub job_title: Option<String>,
    /// State or territory.
    pub state: Option<String>,
    /// Suburb or town.
    pub city: Option<String>,
    /// Compensation text.
    pub income: Option<String>,
    /// Duration text.
    pub duration: Option<String>,
    /// Listing URL.
    pub url: String,
    /// Classifier verdict.
    pub label: ClassificationLabel,
}

impl AggregatedRecord {
    /// Export header.
    pub const COLUMNS: &'static [&'static str] = &[
        "publication_date",
        "job_title",
        "state",
        "city",
        "income",
        "duration",
        "url",
        "label",
    ];

    /// Projects a job record.
    pub fn from_job(job: &JobRecord) -> Self {
        Self {
            publication_date: job.discovered_at,
            job_title: job.title.clone(),
            state: job.state.clone(),
            city: job.suburb.clone(),
            income: job.salary.clone(),
            duration: job.duration.clone(),
            url: job.url.clone(),
            label: job.label,
        }
    }

    /// Renders the record in [`AggregatedRecord::COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_date(&self.publication_date),
            self.job_title.clone().unwrap_or_default(),
            self.state.clone().unwrap_or_default(),
            self.city.clone().unwrap_or_default(),
            self.income.clone().unwrap_or_default(),
            self.duration.clone().unwrap_or_default(),
            self.url.clone(),
            self.label.as_str().to_string(),
        ]
    }

    /// Builds the published table: records from the last `window`
    /// relative to `now`, sorted by publication date then URL.
    pub fn recent_table(records: &[AggregatedRecord], now: DateTime<Utc>, window: Duration) -> Table {
        let cutoff = now - window;
        let mut recent: Vec<&AggregatedRecord> = records
            .iter()
            .filter(|r| r.publication_date >= cutoff)
            .collect();
        recent.sort_by(|a, b| {
            a.publication_date
                .cmp(&b.publication_date)
                .then_with(|| a.url.cmp(&b.url))
        });

        let mut table = Table::new(Self::COLUMNS.iter().copied());
        for record in recent {
            table.push_row(record.to_row());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SiteKind;

    fn record(url: &str, days_ago: i64, now: DateTime<Utc>) -> AggregatedRecord {
        let mut job = JobRecord::new(SiteKind::Agrilabour, url);
        job.discovered_at = now - Duration::days(days_ago);
        AggregatedRecord::from_job(&job)
    }

    #[test]
    fn test_from_job_maps_fields() {
        let mut job = JobRecord::new(SiteKind::Costagroup, "https://example.com/a");
        job.title = Some("Packer".to_string());
        job.suburb = Some("Mildura".to_string());
        job.salary = Some("$30 per hour".to_string());
        job.label = ClassificationLabel::Yes;

        let agg = AggregatedRecord::from_job(&job);
        assert_eq!(agg.job_title.as_deref(), Some("Packer"));
        assert_eq!(agg.city.as_deref(), Some("Mildura"));
        assert_eq!(agg.income.as_deref(), Some("$30 per hour"));
        assert_eq!(agg.publication_date, job.discovered_at);
        assert_eq!(agg.label, ClassificationLabel::Yes);
    }

    #[test]
    fn test_recent_table_filters_and_sorts() {
        let now = Utc::now();
        let records = vec![
            record("https://example.com/b", 1, now),
            record("https://example.com/old", 10, now),
            record("https://example.com/c", 3, now),
            record("https://example.com/a", 1, now),
        ];

        let table = AggregatedRecord::recent_table(&records, now, Duration::days(7));
        let urls: Vec<&str> = table.rows.iter().map(|r| r[6].as_str()).collect();

        assert_eq!(table.columns.len(), AggregatedRecord::COLUMNS.len());
        assert_eq!(
            urls,
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }
}
