//! Vacancy search API types.

use chrono::{DateTime, NaiveDateTime, Utc};
use jobscrape_core::{JobRecord, SiteExtractor, SiteKind};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};
use url::Url;

/// Vacancy search endpoint.
pub const SEARCH_ENDPOINT: &str = "https://www.workforceaustralia.gov.au/api/v1/global/vacancies/";

/// Public detail page prefix; the vacancy id is appended.
pub const DETAILS_BASE: &str = "https://www.workforceaustralia.gov.au/individuals/jobs/details/";

/// Search terms harvested on every run.
pub const CATEGORIES: [&str; 16] = [
    "No experience",
    "Warehouse",
    "Cleaning",
    "Cleaner",
    "Labourer",
    "Pick",
    "Packer",
    "Process worker",
    "Farm hand",
    "Picking",
    "Fruit picking",
    "Grower",
    "Packing",
    "Roadhouse",
    "Housekeeping",
    "Hospitality",
];

/// Builds a search URL for one page (1-based) of a category, newest first.
pub fn search_url(
    endpoint: &str,
    category: &str,
    page: u32,
    page_size: u32,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("searchText", category)
        .append_pair("sort", "DateAddedDescending")
        .append_pair("pageNumber", &page.to_string())
        .append_pair("pageSize", &page_size.to_string());
    Ok(url.into())
}

/// Parses API timestamps, with or without fractional seconds or offset.
/// Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Response Types
// ============================================================================

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Total matches reported by the API.
    #[serde(default)]
    pub total_count: u64,
    /// Results on this page.
    #[serde(default)]
    pub results: Vec<ScoredVacancy>,
}

/// A search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredVacancy {
    /// Relevance score.
    #[serde(default)]
    pub score: f64,
    /// The vacancy.
    pub result: Vacancy,
}

/// Code and label pair used for most enumerations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeLabel {
    /// Machine code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human label.
    #[serde(default)]
    pub label: Option<String>,
}

/// Vacancy as returned by the search API.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacancy {
    pub vacancy_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub creation_date: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub salary: Option<CodeLabel>,
    #[serde(default)]
    pub job_type: Option<CodeLabel>,
    #[serde(default)]
    pub industry: Option<CodeLabel>,
    #[serde(default)]
    pub site: Option<CodeLabel>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_external_job: bool,
    #[serde(default)]
    pub is_new_job: bool,
}

/// Accepts numbers, numeric strings, empty strings and null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Vacancy {
    /// When the vacancy was created.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.creation_date)
    }

    /// Public detail page.
    pub fn details_url(&self) -> String {
        format!("{DETAILS_BASE}{}", self.vacancy_id)
    }

    /// Converts the vacancy into a record found under `category`.
    pub fn into_record(self, category: Option<&str>, score: Option<f64>) -> JobRecord {
        let label = |cl: &Option<CodeLabel>| cl.as_ref().and_then(|c| c.label.clone());

        let mut job = JobRecord::new(SiteKind::WorkforceAustralia, self.details_url());
        job.external_id = Some(self.vacancy_id.to_string());
        job.posted_at = self.created_at();
        job.salary = label(&self.salary);
        job.job_type = label(&self.job_type);
        job.category = category.map(str::to_string);

        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                job.extras.insert(key.to_string(), value);
            }
        };
        put("postCode", self.post_code.clone());
        put("expiryDate", self.expiry_date.clone());
        put("industry", label(&self.industry));
        put("sourceSite", label(&self.site));
        put("latitude", self.latitude.map(|v| v.to_string()));
        put("longitude", self.longitude.map(|v| v.to_string()));
        put("isExternalJob", Some(self.is_external_job.to_string()));
        put("isNewJob", Some(self.is_new_job.to_string()));
        put("score", score.map(|v| v.to_string()));

        job.title = Some(self.title);
        job.description = self.description;
        job.state = self.state;
        job.suburb = self.suburb;
        job
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Builds a record from one vacancy JSON document, scored or bare.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkforceAustraliaExtractor;

impl SiteExtractor for WorkforceAustraliaExtractor {
    fn site(&self) -> SiteKind {
        SiteKind::WorkforceAustralia
    }

    fn extract(&self, content: &str, source_url: &str) -> JobRecord {
        debug!(url = source_url, len = content.len(), "Parsing vacancy JSON");

        if let Ok(scored) = serde_json::from_str::<ScoredVacancy>(content) {
            return scored.result.into_record(None, Some(scored.score));
        }
        match serde_json::from_str::<Vacancy>(content) {
            Ok(vacancy) => vacancy.into_record(None, None),
            Err(e) => {
                warn!(url = source_url, error = %e, "Vacancy JSON not understood");
                JobRecord::new(SiteKind::WorkforceAustralia, source_url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const PAGE: &str = r#"{
        "totalCount": 2,
        "results": [
            {
                "score": 12.5,
                "result": {
                    "vacancyId": 9001,
                    "title": "Fruit Picker",
                    "description": "Seasonal picking work.",
                    "creationDate": "2024-03-01T09:15:30.123",
                    "expiryDate": "2024-04-01T00:00:00",
                    "state": "QLD",
                    "suburb": "Bundaberg",
                    "postCode": "4670",
                    "salary": {"code": "S1", "label": "$28 per hour"},
                    "industry": {"code": "A", "label": "Agriculture"},
                    "site": {"code": "WFA", "label": "Workforce Australia"},
                    "latitude": "-24.86",
                    "longitude": 152.35,
                    "isExternalJob": false,
                    "isNewJob": true
                }
            },
            {
                "score": 3.0,
                "result": {
                    "vacancyId": 9002,
                    "title": "Cleaner",
                    "creationDate": "2024-02-28T10:00:00",
                    "latitude": ""
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_search_page() {
        let page: SearchResponse = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.results.len(), 2);

        let first = &page.results[0].result;
        assert_eq!(first.latitude, Some(-24.86));
        assert_eq!(first.longitude, Some(152.35));
        assert!(page.results[1].result.latitude.is_none());
    }

    #[test]
    fn test_into_record() {
        let page: SearchResponse = serde_json::from_str(PAGE).unwrap();
        let hit = page.results[0].clone();
        let job = hit.result.into_record(Some("Picking"), Some(hit.score));

        assert_eq!(
            job.url,
            "https://www.workforceaustralia.gov.au/individuals/jobs/details/9001"
        );
        assert_eq!(job.external_id.as_deref(), Some("9001"));
        assert_eq!(job.title.as_deref(), Some("Fruit Picker"));
        assert_eq!(job.salary.as_deref(), Some("$28 per hour"));
        assert_eq!(job.category.as_deref(), Some("Picking"));
        assert_eq!(job.extras.get("postCode").map(String::as_str), Some("4670"));
        assert_eq!(job.extras.get("industry").map(String::as_str), Some("Agriculture"));
        assert_eq!(job.extras.get("isNewJob").map(String::as_str), Some("true"));
        assert_eq!(job.extras.get("score").map(String::as_str), Some("12.5"));

        let posted = job.posted_at.unwrap();
        assert_eq!((posted.year(), posted.month(), posted.day()), (2024, 3, 1));
        assert_eq!(posted.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-03-01T09:15:30").is_some());
        assert!(parse_timestamp("2024-03-01T09:15:30.5").is_some());
        assert!(parse_timestamp("2024-03-01T09:15:30Z").is_some());
        assert!(parse_timestamp("2024-03-01T09:15:30+10:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_search_url_encodes_category() {
        let url = search_url(SEARCH_ENDPOINT, "Fruit picking", 2, 100).unwrap();
        assert!(url.starts_with(SEARCH_ENDPOINT));
        assert!(url.contains("searchText=Fruit+picking"));
        assert!(url.contains("sort=DateAddedDescending"));
        assert!(url.contains("pageNumber=2"));
        assert!(url.contains("pageSize=100"));
    }

    #[test]
    fn test_extractor_accepts_bare_vacancy() {
        let json = r#"{"vacancyId": 5, "title": "Packer", "creationDate": "2024-01-01T00:00:00"}"#;
        let job = WorkforceAustraliaExtractor.extract(json, "ignored");
        assert_eq!(job.external_id.as_deref(), Some("5"));
        assert!(job.url.ends_with("/5"));

        let broken = WorkforceAustraliaExtractor.extract("<html>", "https://example.com/x");
        assert_eq!(broken.url, "https://example.com/x");
        assert!(broken.title.is_none());
    }
}
