//! Shared test doubles.

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use jobscrape_core::{
    AggregatedRecord, ClassificationLabel, Classifier, CoreError, Exporter, InsertOutcome,
    JobRecord, JobRepository, SiteKind, Table,
};
use jobscrape_fetch::{AcquisitionSession, BlockDetector, HttpFetcher, HttpSettings};

/// Pads a page past the default minimum content length.
pub fn padded(html: &str) -> String {
    format!("{html}<!-- {} -->", "x".repeat(2100))
}

pub fn http_session(min_content_len: usize) -> AcquisitionSession<HttpFetcher> {
    let fetcher = HttpFetcher::from_settings(&HttpSettings {
        timeout_secs: 5,
        max_attempts: 1,
        retry_delay_secs: 0,
    });
    AcquisitionSession::new(fetcher, BlockDetector::new().with_min_content_len(min_content_len))
}

// ============================================================================
// Repository
// ============================================================================

#[derive(Default)]
pub struct MemoryRepo {
    pub jobs: Mutex<Vec<JobRecord>>,
    pub aggregated: Mutex<Vec<AggregatedRecord>>,
}

impl MemoryRepo {
    pub fn with_jobs(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            aggregated: Mutex::default(),
        }
    }

    pub fn jobs(&self) -> Vec<JobRecord> {
        self.jobs.lock().unwrap().clone()
    }
}

impl JobRepository for MemoryRepo {
    fn exists_by_url(&self, site: SiteKind, url: &str) -> Result<bool, CoreError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .any(|j| j.site == site && j.url == url))
    }

    fn insert(&self, record: &JobRecord) -> Result<InsertOutcome, CoreError> {
        if self.exists_by_url(record.site, &record.url)? {
            return Ok(InsertOutcome::Duplicate);
        }
        self.jobs.lock().unwrap().push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    fn all(&self, site: SiteKind) -> Result<Vec<JobRecord>, CoreError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.site == site)
            .cloned()
            .collect())
    }

    fn update_label(
        &self,
        site: SiteKind,
        url: &str,
        label: ClassificationLabel,
    ) -> Result<(), CoreError> {
        for job in self.jobs.lock().unwrap().iter_mut() {
            if job.site == site && job.url == url {
                job.label = label;
            }
        }
        Ok(())
    }

    fn latest_posted_at(
        &self,
        site: SiteKind,
        category: &str,
    ) -> Result<Option<DateTime<Utc>>, CoreError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.site == site && j.category.as_deref() == Some(category))
            .filter_map(|j| j.posted_at)
            .max())
    }

    fn replace_aggregated(&self, records: &[AggregatedRecord]) -> Result<usize, CoreError> {
        let mut stored = self.aggregated.lock().unwrap();
        for record in records {
            stored.retain(|r| r.url != record.url);
            stored.push(record.clone());
        }
        Ok(records.len())
    }

    fn aggregated(&self) -> Result<Vec<AggregatedRecord>, CoreError> {
        Ok(self.aggregated.lock().unwrap().clone())
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Answers from the title: "Picker" is yes, "Manager" is no, anything else
/// errors. Empty descriptions are no.
#[derive(Default)]
pub struct TitleClassifier {
    pub calls: Mutex<Vec<String>>,
}

impl Classifier for TitleClassifier {
    async fn classify(&self, job: &JobRecord) -> ClassificationLabel {
        self.calls.lock().unwrap().push(job.url.clone());
        if job.has_empty_description() {
            return ClassificationLabel::No;
        }
        match job.title.as_deref() {
            Some(t) if t.contains("Picker") => ClassificationLabel::Yes,
            Some(t) if t.contains("Manager") => ClassificationLabel::No,
            _ => ClassificationLabel::Error,
        }
    }
}

// ============================================================================
// Exporter
// ============================================================================

#[derive(Default)]
pub struct RecordingExporter {
    pub published: Mutex<Vec<(String, Table)>>,
}

impl RecordingExporter {
    pub fn table(&self, worksheet: &str) -> Option<Table> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| name == worksheet)
            .map(|(_, table)| table.clone())
    }
}

impl Exporter for RecordingExporter {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn publish(&self, worksheet: &str, table: &Table) -> Result<(), CoreError> {
        self.published
            .lock()
            .unwrap()
            .push((worksheet.to_string(), table.clone()));
        Ok(())
    }
}
