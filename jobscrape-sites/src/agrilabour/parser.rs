//! Agri Labour detail page parser.
//!
//! The heading carries title and location as `"<title> - <suburb>, <state>"`.
//! Pay, duration and start date are loose `<li>` items in the summary.

use jobscrape_core::{JobRecord, SiteExtractor, SiteKind};
use scraper::Html;
use tracing::debug;

use crate::html::{block_text, first, first_text, find_text_containing, require};

/// Extractor for Agri Labour detail pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgrilabourExtractor;

impl SiteExtractor for AgrilabourExtractor {
    fn site(&self) -> SiteKind {
        SiteKind::Agrilabour
    }

    fn extract(&self, content: &str, source_url: &str) -> JobRecord {
        debug!(url = source_url, len = content.len(), "Parsing Agri Labour job");

        let doc = Html::parse_document(content);
        let heading = first_text(&doc, "div.job-detail-top h2");
        let heading = heading.as_deref();

        let mut job = JobRecord::new(SiteKind::Agrilabour, source_url);
        job.title = require("title", source_url, heading.and_then(title_of));
        job.state = require("state", source_url, heading.and_then(state_of));
        job.suburb = require("suburb", source_url, heading.and_then(suburb_of));
        job.description = require(
            "description",
            source_url,
            first(&doc, "div.job-detail-bottom").and_then(|el| block_text(el, &["script", "style"])),
        );
        job.job_type = Some("casual".to_string());
        job.salary = require(
            "salary",
            source_url,
            find_text_containing(&doc, "li", "per hour"),
        );
        job.duration = require(
            "duration",
            source_url,
            find_text_containing(&doc, "li", "Duration:").and_then(|t| last_field(&t)),
        );
        job.start_date = require(
            "start_date",
            source_url,
            find_text_containing(&doc, "li", "Start:").and_then(|t| last_field(&t)),
        );
        job
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn title_of(heading: &str) -> Option<String> {
    heading.split(" - ").next().and_then(non_empty)
}

fn state_of(heading: &str) -> Option<String> {
    let (_, state) = heading.rsplit_once(',')?;
    non_empty(state)
}

fn suburb_of(heading: &str) -> Option<String> {
    let location = heading.split(" - ").nth(1)?;
    location.split(',').next().and_then(non_empty)
}

/// Text after the last `:`.
fn last_field(text: &str) -> Option<String> {
    text.rsplit(':').next().and_then(non_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="job-detail-top">
            <h2>Strawberry Picker - Stanthorpe, QLD</h2>
            <ul>
              <li>$28.50 per hour</li>
              <li>Duration: 3 months</li>
              <li>Start: ASAP</li>
            </ul>
          </div>
          <div class="job-detail-bottom">
            <p>Picking strawberries in a friendly team.</p>
            <p>Own transport required.</p>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_all_fields() {
        let job = AgrilabourExtractor.extract(PAGE, "https://www.agrilabour.com.au/job/1");

        assert_eq!(job.site, SiteKind::Agrilabour);
        assert_eq!(job.url, "https://www.agrilabour.com.au/job/1");
        assert_eq!(job.title.as_deref(), Some("Strawberry Picker"));
        assert_eq!(job.suburb.as_deref(), Some("Stanthorpe"));
        assert_eq!(job.state.as_deref(), Some("QLD"));
        assert_eq!(job.job_type.as_deref(), Some("casual"));
        assert_eq!(job.salary.as_deref(), Some("$28.50 per hour"));
        assert_eq!(job.duration.as_deref(), Some("3 months"));
        assert_eq!(job.start_date.as_deref(), Some("ASAP"));
        assert_eq!(
            job.description.as_deref(),
            Some("Picking strawberries in a friendly team.\nOwn transport required.")
        );
    }

    #[test]
    fn test_missing_fields_are_none() {
        let job = AgrilabourExtractor.extract("<html><h2>Untitled</h2></html>", "u");

        assert!(job.title.is_none());
        assert!(job.state.is_none());
        assert!(job.description.is_none());
        assert!(job.salary.is_none());
        assert_eq!(job.job_type.as_deref(), Some("casual"));
    }

    #[test]
    fn test_heading_without_location() {
        assert_eq!(title_of("Packer").as_deref(), Some("Packer"));
        assert!(suburb_of("Packer").is_none());
        assert!(state_of("Packer").is_none());
    }
}
