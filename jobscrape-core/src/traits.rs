//! Trait definitions for jobscrape.
//!
//! These are the collaborators the harvest loop talks to. Concrete
//! implementations live in the sites, store and services crates.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::models::{AggregatedRecord, ClassificationLabel, JobRecord, SiteKind, Table};

/// Result of inserting a record keyed by URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same URL already existed; nothing was written.
    Duplicate,
}

/// Turns a fetched detail page into a [`JobRecord`].
///
/// Missing fields are left as `None`; extraction never fails the whole
/// record.
pub trait SiteExtractor: Send + Sync {
    /// Site this extractor understands.
    fn site(&self) -> SiteKind;

    /// Extracts a record from page content fetched from `source_url`.
    fn extract(&self, content: &str, source_url: &str) -> JobRecord;
}

/// Persistent storage for job records and aggregated records.
pub trait JobRepository: Send + Sync {
    /// Returns true if a record with this URL is stored for the site.
    fn exists_by_url(&self, site: SiteKind, url: &str) -> Result<bool, CoreError>;

    /// Inserts a record unless its URL is already stored.
    fn insert(&self, record: &JobRecord) -> Result<InsertOutcome, CoreError>;

    /// Returns all records for a site, oldest first.
    fn all(&self, site: SiteKind) -> Result<Vec<JobRecord>, CoreError>;

    /// Overwrites the label of one record.
    fn update_label(
        &self,
        site: SiteKind,
        url: &str,
        label: ClassificationLabel,
    ) -> Result<(), CoreError>;

    /// Latest `posted_at` among a site's records in `category`.
    fn latest_posted_at(
        &self,
        site: SiteKind,
        category: &str,
    ) -> Result<Option<DateTime<Utc>>, CoreError>;

    /// Replaces aggregated rows by URL: each incoming record deletes any
    /// stored row with the same URL before being written.
    fn replace_aggregated(&self, records: &[AggregatedRecord]) -> Result<usize, CoreError>;

    /// Returns every aggregated record.
    fn aggregated(&self) -> Result<Vec<AggregatedRecord>, CoreError>;
}

/// Assigns a suitability label to a listing.
///
/// Failures are reported as [`ClassificationLabel::Error`] rather than as
/// errors, so one bad call never stops a classification pass.
pub trait Classifier: Send + Sync {
    /// Classifies one record.
    fn classify(
        &self,
        job: &JobRecord,
    ) -> impl std::future::Future<Output = ClassificationLabel> + Send;
}

/// Publishes tables to an external destination.
pub trait Exporter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Replaces the whole content of `worksheet` with `table`.
    fn publish(
        &self,
        worksheet: &str,
        table: &Table,
    ) -> impl std::future::Future<Output = Result<(), CoreError>> + Send;
}
