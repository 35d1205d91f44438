//! Harvest orchestration.
//!
//! One run per site: discover listings, acquire and extract each new detail
//! page, persist. Later phases classify unlabelled records, rebuild the
//! cross-site aggregate and publish tables.
//!
//! Per-URL failures are logged and counted in the report. Only storage
//! failures and fatal acquisition errors (a browser that cannot launch)
//! abort a phase.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jobscrape_core::{
    AggregatedRecord, ClassificationLabel, Classifier, Exporter, InsertOutcome, JobRecord,
    JobRepository, SiteExtractor, SiteKind, Table,
};
use jobscrape_fetch::{AcquisitionSession, FetchError, PageFetcher};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::descriptor::{ApiPlan, Discovery, ListingPlan};
use crate::error::SitesError;
use crate::html::collect_links;
use crate::workforceaustralia::{ScoredVacancy, SearchResponse, search_url};

/// Worksheet receiving the cross-site table.
pub const AGGREGATED_WORKSHEET: &str = "all";

/// Days of aggregated records kept in the published table.
pub const AGGREGATED_WINDOW_DAYS: i64 = 7;

// ============================================================================
// Plan
// ============================================================================

/// Everything needed to harvest one site.
pub struct HarvestPlan {
    /// Site being harvested.
    pub site: SiteKind,
    /// Discovery strategy.
    pub discovery: Discovery,
    extractor: Box<dyn SiteExtractor>,
}

impl HarvestPlan {
    /// Creates a plan.
    pub fn new(site: SiteKind, discovery: Discovery, extractor: Box<dyn SiteExtractor>) -> Self {
        Self {
            site,
            discovery,
            extractor,
        }
    }

    /// Replaces the listing pages of a listing plan.
    #[must_use]
    pub fn with_listing_urls(mut self, urls: Vec<String>) -> Self {
        match &mut self.discovery {
            Discovery::Listing(plan) => plan.urls = urls,
            Discovery::Api(_) => warn!(site = %self.site, "Listing URLs ignored for API site"),
        }
        self
    }

    /// Replaces the detail link selector of a listing plan.
    #[must_use]
    pub fn with_link_selector(mut self, selector: impl Into<String>) -> Self {
        match &mut self.discovery {
            Discovery::Listing(plan) => plan.link_selector = selector.into(),
            Discovery::Api(_) => warn!(site = %self.site, "Link selector ignored for API site"),
        }
        self
    }

    /// Replaces the search endpoint of an API plan.
    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        match &mut self.discovery {
            Discovery::Api(plan) => plan.endpoint = endpoint.into(),
            Discovery::Listing(_) => warn!(site = %self.site, "Endpoint ignored for listing site"),
        }
        self
    }

    /// Restricts an API plan to the given search categories.
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        if let Discovery::Api(plan) = &mut self.discovery {
            plan.categories = categories;
        }
        self
    }

    /// The detail-page extractor.
    pub fn extractor(&self) -> &dyn SiteExtractor {
        self.extractor.as_ref()
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Counters for one site harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Site harvested.
    pub site: SiteKind,
    /// Distinct listings discovered.
    pub discovered: usize,
    /// Listings already stored and not fetched again.
    pub skipped_existing: usize,
    /// New records written.
    pub inserted: usize,
    /// Records rejected by the unique constraint.
    pub duplicates: usize,
    /// Listings that could not be acquired or stored.
    pub failed: usize,
    /// Listing or search pages that could not be acquired.
    pub listing_failures: usize,
}

impl HarvestReport {
    /// Empty report for `site`.
    pub fn new(site: SiteKind) -> Self {
        Self {
            site,
            discovered: 0,
            skipped_existing: 0,
            inserted: 0,
            duplicates: 0,
            failed: 0,
            listing_failures: 0,
        }
    }
}

/// Counters for one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassifyReport {
    /// Records looked at.
    pub examined: usize,
    /// Records that already had a terminal label.
    pub skipped: usize,
    /// Records that received `yes`, `no` or `maybe`.
    pub classified: usize,
    /// Records labelled `error`.
    pub errors: usize,
}

// ============================================================================
// Harvest
// ============================================================================

/// Harvests one site into `repo`.
///
/// # Errors
///
/// Storage failures, fatal acquisition errors, or an API plan whose
/// endpoint is not a URL.
#[instrument(skip_all, fields(site = %plan.site))]
pub async fn harvest<F, R>(
    plan: &HarvestPlan,
    session: &mut AcquisitionSession<F>,
    repo: &R,
) -> Result<HarvestReport, SitesError>
where
    F: PageFetcher,
    R: JobRepository,
{
    let mut report = HarvestReport::new(plan.site);

    match &plan.discovery {
        Discovery::Listing(listing) => {
            harvest_listing(plan, listing, session, repo, &mut report).await?;
        }
        Discovery::Api(api) => {
            harvest_api(plan.site, api, session, repo, &mut report).await?;
        }
    }

    info!(
        discovered = report.discovered,
        skipped = report.skipped_existing,
        inserted = report.inserted,
        duplicates = report.duplicates,
        failed = report.failed,
        listing_failures = report.listing_failures,
        "Harvest finished"
    );
    Ok(report)
}

/// Splits fatal fetch errors from per-URL ones.
fn escalate(err: FetchError) -> Result<FetchError, SitesError> {
    if err.is_fatal() {
        error!(error = %err, "Fatal acquisition error, aborting site");
        Err(SitesError::Fetch(err))
    } else {
        Ok(err)
    }
}

async fn harvest_listing<F, R>(
    plan: &HarvestPlan,
    listing: &ListingPlan,
    session: &mut AcquisitionSession<F>,
    repo: &R,
    report: &mut HarvestReport,
) -> Result<(), SitesError>
where
    F: PageFetcher,
    R: JobRepository,
{
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for listing_url in &listing.urls {
        let pages = if listing.paginate {
            session.fetch_all_pages(listing_url).await
        } else {
            session.fetch(listing_url).await.map(|page| vec![page])
        };

        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                let e = escalate(e)?;
                warn!(listing_url = %listing_url, error = %e, "Listing page failed, continuing");
                report.listing_failures += 1;
                continue;
            }
        };

        let before = links.len();
        for page in &pages {
            for link in collect_links(page, &listing.link_selector, listing_url) {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }
        info!(
            listing_url = %listing_url,
            pages = pages.len(),
            new_links = links.len() - before,
            "Scanned listing"
        );
    }

    report.discovered = links.len();

    for url in links {
        if repo.exists_by_url(plan.site, &url)? {
            debug!(url = %url, "Already stored, skipping");
            report.skipped_existing += 1;
            continue;
        }

        let content = match session.fetch(&url).await {
            Ok(content) => content,
            Err(e) => {
                let e = escalate(e)?;
                error!(url = %url, error = %e, "Detail page failed");
                report.failed += 1;
                continue;
            }
        };

        let record = plan.extractor().extract(&content, &url);
        store(repo, &record, report)?;
    }

    Ok(())
}

async fn harvest_api<F, R>(
    site: SiteKind,
    api: &ApiPlan,
    session: &mut AcquisitionSession<F>,
    repo: &R,
    report: &mut HarvestReport,
) -> Result<(), SitesError>
where
    F: PageFetcher,
    R: JobRepository,
{
    let default_since = (Utc::now() - Duration::days(api.lookback_days)).date_naive();

    for category in &api.categories {
        let since = repo
            .latest_posted_at(site, category)?
            .map_or(default_since, |latest| latest.date_naive());
        debug!(category = %category, since = %since, "Searching category");

        let hits = search_category(api, category, since, session, report).await?;
        info!(category = %category, new = hits.len(), "Category searched");

        for hit in hits {
            report.discovered += 1;
            let record = hit.result.into_record(Some(category), Some(hit.score));

            if repo.exists_by_url(site, &record.url)? {
                report.skipped_existing += 1;
                continue;
            }
            store(repo, &record, report)?;
        }
    }

    Ok(())
}

/// Pages through one category, newest first, until an empty page or a
/// vacancy created on or before `since`.
async fn search_category<F: PageFetcher>(
    api: &ApiPlan,
    category: &str,
    since: NaiveDate,
    session: &mut AcquisitionSession<F>,
    report: &mut HarvestReport,
) -> Result<Vec<ScoredVacancy>, SitesError> {
    let mut hits = Vec::new();

    for page in 1..=api.max_pages {
        let url = search_url(&api.endpoint, category, page, api.page_size)
            .map_err(|e| SitesError::InvalidPlan(format!("{}: {e}", api.endpoint)))?;

        let body = match session.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                let e = escalate(e)?;
                warn!(url = %url, error = %e, "Search page failed");
                report.listing_failures += 1;
                break;
            }
        };

        let response: SearchResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Search page is not valid JSON");
                report.listing_failures += 1;
                break;
            }
        };

        if response.results.is_empty() {
            debug!(page, "No more results");
            break;
        }

        let mut reached_known = false;
        for hit in response.results {
            match hit.result.created_at() {
                Some(created) if created.date_naive() <= since => {
                    debug!(vacancy_id = hit.result.vacancy_id, created = %created, "Reached known listings");
                    reached_known = true;
                    break;
                }
                Some(_) => {}
                None => warn!(
                    vacancy_id = hit.result.vacancy_id,
                    raw = %hit.result.creation_date,
                    "Unparseable creation date, keeping"
                ),
            }
            hits.push(hit);
        }

        if reached_known {
            break;
        }
        if page == api.max_pages {
            warn!(category, max_pages = api.max_pages, "Search page cap reached");
        }
    }

    Ok(hits)
}

fn store<R: JobRepository>(
    repo: &R,
    record: &JobRecord,
    report: &mut HarvestReport,
) -> Result<(), SitesError> {
    if record.url.trim().is_empty() {
        warn!("Extracted record has no URL, skipping");
        report.failed += 1;
        return Ok(());
    }

    match repo.insert(record)? {
        InsertOutcome::Inserted => report.inserted += 1,
        InsertOutcome::Duplicate => report.duplicates += 1,
    }
    Ok(())
}

// ============================================================================
// Later Phases
// ============================================================================

/// Labels every record of `site` that has no terminal label yet.
///
/// # Errors
///
/// Storage failures only; classifier failures become the `error` label.
#[instrument(skip_all, fields(site = %site))]
pub async fn classify_pending<R, C>(
    repo: &R,
    classifier: &C,
    site: SiteKind,
) -> Result<ClassifyReport, SitesError>
where
    R: JobRepository,
    C: Classifier,
{
    let mut report = ClassifyReport::default();

    for job in repo.all(site)? {
        report.examined += 1;
        if job.label.is_terminal() {
            report.skipped += 1;
            continue;
        }

        let label = classifier.classify(&job).await;
        debug!(url = %job.url, label = %label, "Classified");
        if label == ClassificationLabel::Error {
            report.errors += 1;
        } else {
            report.classified += 1;
        }
        repo.update_label(site, &job.url, label)?;
    }

    info!(
        examined = report.examined,
        skipped = report.skipped,
        classified = report.classified,
        errors = report.errors,
        "Classification finished"
    );
    Ok(report)
}

/// Rebuilds aggregated records from every stored record of `sites`.
///
/// # Errors
///
/// Storage failures.
pub fn rebuild_aggregated<R: JobRepository>(
    repo: &R,
    sites: &[SiteKind],
) -> Result<usize, SitesError> {
    let mut records = Vec::new();
    for site in sites {
        records.extend(repo.all(*site)?.iter().map(AggregatedRecord::from_job));
    }
    Ok(repo.replace_aggregated(&records)?)
}

/// Table of a site's records, one row per record.
pub fn site_table(jobs: &[JobRecord]) -> Table {
    let mut table = Table::new(JobRecord::COLUMNS.iter().copied());
    for job in jobs {
        table.push_row(job.to_row());
    }
    table
}

/// Publishes all records of `site` to the worksheet named after it.
///
/// # Errors
///
/// Storage or exporter failures.
#[instrument(skip_all, fields(site = %site, exporter = exporter.name()))]
pub async fn publish_site<R, E>(repo: &R, exporter: &E, site: SiteKind) -> Result<usize, SitesError>
where
    R: JobRepository,
    E: Exporter,
{
    let table = site_table(&repo.all(site)?);
    exporter.publish(site.worksheet(), &table).await?;
    info!(rows = table.len(), worksheet = site.worksheet(), "Published site table");
    Ok(table.len())
}

/// Publishes aggregated records from the last week, sorted by date then
/// URL, to the `all` worksheet.
///
/// # Errors
///
/// Storage or exporter failures.
#[instrument(skip_all, fields(exporter = exporter.name()))]
pub async fn publish_aggregated<R, E>(
    repo: &R,
    exporter: &E,
    now: DateTime<Utc>,
) -> Result<usize, SitesError>
where
    R: JobRepository,
    E: Exporter,
{
    let table = AggregatedRecord::recent_table(
        &repo.aggregated()?,
        now,
        Duration::days(AGGREGATED_WINDOW_DAYS),
    );
    exporter.publish(AGGREGATED_WORKSHEET, &table).await?;
    info!(rows = table.len(), worksheet = AGGREGATED_WORKSHEET, "Published aggregated table");
    Ok(table.len())
}
