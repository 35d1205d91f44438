//! SQLite-backed job repository.
//!
//! One table per record shape: `jobs` holds every site's listings keyed by
//! `(site, url)`, `all_jobs` holds the cross-site projection keyed by `url`.
//! Timestamps are stored as RFC 3339 text.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use jobscrape_core::{
    AggregatedRecord, ClassificationLabel, CoreError, InsertOutcome, JobRecord, JobRepository,
    SiteKind,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    site          TEXT NOT NULL,
    url           TEXT NOT NULL,
    external_id   TEXT,
    title         TEXT,
    description   TEXT,
    state         TEXT,
    suburb        TEXT,
    job_type      TEXT,
    salary        TEXT,
    duration      TEXT,
    start_date    TEXT,
    category      TEXT,
    posted_at     TEXT,
    discovered_at TEXT NOT NULL,
    label         TEXT,
    extras        TEXT NOT NULL DEFAULT '{}',
    UNIQUE (site, url)
);

CREATE INDEX IF NOT EXISTS idx_jobs_site_category ON jobs (site, category);

CREATE TABLE IF NOT EXISTS all_jobs (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    publication_date TEXT NOT NULL,
    job_title        TEXT,
    state            TEXT,
    city             TEXT,
    income           TEXT,
    duration         TEXT,
    url              TEXT NOT NULL UNIQUE,
    label            TEXT
);
";

const JOB_COLUMNS: &str = "site, url, external_id, title, description, state, suburb, job_type, \
     salary, duration, start_date, category, posted_at, discovered_at, label, extras";

// ============================================================================
// Job Store
// ============================================================================

/// SQLite implementation of [`JobRepository`].
///
/// The connection sits behind a mutex; the harvest loop uses it
/// sequentially.
pub struct JobStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for JobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobStore").finish_non_exhaustive()
    }
}

impl JobStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened job database");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of stored job records for a site.
    pub fn count(&self, site: SiteKind) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE site = ?1",
            params![site.cli_name()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ------------------------------------------------------------------------
    // Store operations
    // ------------------------------------------------------------------------

    fn exists(&self, site: SiteKind, url: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM jobs WHERE site = ?1 AND url = ?2",
                params![site.cli_name(), url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    #[instrument(skip(self, record), fields(site = %record.site, url = %record.url))]
    fn insert_job(&self, record: &JobRecord) -> Result<InsertOutcome, StoreError> {
        let extras = serde_json::to_string(&record.extras)?;
        let conn = self.lock()?;

        let result = conn.execute(
            &format!(
                "INSERT INTO jobs ({JOB_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                record.site.cli_name(),
                record.url,
                record.external_id,
                record.title,
                record.description,
                record.state,
                record.suburb,
                record.job_type,
                record.salary,
                record.duration,
                record.start_date,
                record.category,
                record.posted_at.as_ref().map(encode_time),
                encode_time(&record.discovered_at),
                encode_label(record.label),
                extras,
            ],
        );

        match result {
            Ok(_) => {
                debug!("Inserted job record");
                Ok(InsertOutcome::Inserted)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                warn!("Job record already stored, skipping");
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn all_jobs(&self, site: SiteKind) -> Result<Vec<JobRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE site = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![site.cli_name()], RawJob::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawJob::into_record).collect()
    }

    fn set_label(
        &self,
        site: SiteKind,
        url: &str,
        label: ClassificationLabel,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE jobs SET label = ?1 WHERE site = ?2 AND url = ?3",
            params![encode_label(label), site.cli_name(), url],
        )?;
        if changed == 0 {
            warn!(site = %site, url = %url, "No stored record to label");
        }
        Ok(())
    }

    fn latest_posted(
        &self,
        site: SiteKind,
        category: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        let latest: Option<String> = conn.query_row(
            "SELECT MAX(posted_at) FROM jobs WHERE site = ?1 AND category = ?2",
            params![site.cli_name(), category],
            |row| row.get(0),
        )?;
        latest.as_deref().map(decode_time).transpose()
    }

    #[instrument(skip_all, fields(count = records.len()))]
    fn replace_all_jobs(&self, records: &[AggregatedRecord]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut delete = tx.prepare("DELETE FROM all_jobs WHERE url = ?1")?;
            let mut insert = tx.prepare(
                "INSERT INTO all_jobs \
                 (publication_date, job_title, state, city, income, duration, url, label) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                delete.execute(params![record.url])?;
                insert.execute(params![
                    encode_time(&record.publication_date),
                    record.job_title,
                    record.state,
                    record.city,
                    record.income,
                    record.duration,
                    record.url,
                    encode_label(record.label),
                ])?;
            }
        }
        tx.commit()?;

        info!(count = records.len(), "Rebuilt aggregated records");
        Ok(records.len())
    }

    fn all_aggregated(&self) -> Result<Vec<AggregatedRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT publication_date, job_title, state, city, income, duration, url, label \
             FROM all_jobs ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, job_title, state, city, income, duration, url, label)| {
                Ok(AggregatedRecord {
                    publication_date: decode_time(&date)?,
                    job_title,
                    state,
                    city,
                    income,
                    duration,
                    url,
                    label: decode_label(label.as_deref())?,
                })
            })
            .collect()
    }
}

impl JobRepository for JobStore {
    fn exists_by_url(&self, site: SiteKind, url: &str) -> Result<bool, CoreError> {
        Ok(self.exists(site, url)?)
    }

    fn insert(&self, record: &JobRecord) -> Result<InsertOutcome, CoreError> {
        Ok(self.insert_job(record)?)
    }

    fn all(&self, site: SiteKind) -> Result<Vec<JobRecord>, CoreError> {
        Ok(self.all_jobs(site)?)
    }

    fn update_label(
        &self,
        site: SiteKind,
        url: &str,
        label: ClassificationLabel,
    ) -> Result<(), CoreError> {
        Ok(self.set_label(site, url, label)?)
    }

    fn latest_posted_at(
        &self,
        site: SiteKind,
        category: &str,
    ) -> Result<Option<DateTime<Utc>>, CoreError> {
        Ok(self.latest_posted(site, category)?)
    }

    fn replace_aggregated(&self, records: &[AggregatedRecord]) -> Result<usize, CoreError> {
        Ok(self.replace_all_jobs(records)?)
    }

    fn aggregated(&self) -> Result<Vec<AggregatedRecord>, CoreError> {
        Ok(self.all_aggregated()?)
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

/// Job row as stored, before text fields are parsed back.
struct RawJob {
    site: String,
    url: String,
    external_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    state: Option<String>,
    suburb: Option<String>,
    job_type: Option<String>,
    salary: Option<String>,
    duration: Option<String>,
    start_date: Option<String>,
    category: Option<String>,
    posted_at: Option<String>,
    discovered_at: String,
    label: Option<String>,
    extras: String,
}

impl RawJob {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            site: row.get(0)?,
            url: row.get(1)?,
            external_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            state: row.get(5)?,
            suburb: row.get(6)?,
            job_type: row.get(7)?,
            salary: row.get(8)?,
            duration: row.get(9)?,
            start_date: row.get(10)?,
            category: row.get(11)?,
            posted_at: row.get(12)?,
            discovered_at: row.get(13)?,
            label: row.get(14)?,
            extras: row.get(15)?,
        })
    }

    fn into_record(self) -> Result<JobRecord, StoreError> {
        let site = self
            .site
            .parse::<SiteKind>()
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(JobRecord {
            site,
            url: self.url,
            external_id: self.external_id,
            title: self.title,
            description: self.description,
            state: self.state,
            suburb: self.suburb,
            job_type: self.job_type,
            salary: self.salary,
            duration: self.duration,
            start_date: self.start_date,
            category: self.category,
            posted_at: self.posted_at.as_deref().map(decode_time).transpose()?,
            discovered_at: decode_time(&self.discovered_at)?,
            label: decode_label(self.label.as_deref())?,
            extras: serde_json::from_str(&self.extras)?,
        })
    }
}

fn encode_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Parse(format!("timestamp {raw:?}: {e}")))
}

/// `Unset` is stored as NULL.
fn encode_label(label: ClassificationLabel) -> Option<&'static str> {
    match label {
        ClassificationLabel::Unset => None,
        other => Some(other.as_str()),
    }
}

fn decode_label(raw: Option<&str>) -> Result<ClassificationLabel, StoreError> {
    raw.map_or(Ok(ClassificationLabel::Unset), |s| {
        s.parse().map_err(|e: CoreError| StoreError::Parse(e.to_string()))
    })
}
