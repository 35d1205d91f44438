//! Costa Group detail page parser.
//!
//! Metadata paragraphs are labelled, e.g. `Location: Mildura`.

use jobscrape_core::{JobRecord, SiteExtractor, SiteKind};
use scraper::Html;
use tracing::debug;

use crate::html::{NON_DESCRIPTION_TAGS, after_colon, block_text, first, first_text, require};

/// Extractor for Costa Group detail pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostagroupExtractor;

impl SiteExtractor for CostagroupExtractor {
    fn site(&self) -> SiteKind {
        SiteKind::Costagroup
    }

    fn extract(&self, content: &str, source_url: &str) -> JobRecord {
        debug!(url = source_url, len = content.len(), "Parsing Costa Group job");

        let doc = Html::parse_document(content);
        let labelled = |css: &str| first_text(&doc, css).and_then(|t| after_colon(&t));

        let mut job = JobRecord::new(SiteKind::Costagroup, source_url);
        job.title = require(
            "title",
            source_url,
            first_text(&doc, "h1").and_then(|h| {
                let title = h.split('-').next()?.trim().to_string();
                (!title.is_empty()).then_some(title)
            }),
        );
        job.description = require(
            "description",
            source_url,
            first(&doc, "div.job-ad-body").and_then(|el| block_text(el, NON_DESCRIPTION_TAGS)),
        );
        job.suburb = require("suburb", source_url, labelled("p.job-location"));
        job.job_type = require("job_type", source_url, first_text(&doc, "p.job-type"));
        // The board only publishes a closing date; it stands in for the start date.
        job.start_date = require("start_date", source_url, labelled("p.job-closing"));
        job.category = require("category", source_url, labelled("p.job-category"));
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1>Harvest Team Member - Mildura Citrus</h1>
          <p class="job-location">Location: Mildura, VIC</p>
          <p class="job-type">Seasonal</p>
          <p class="job-closing">Closing Date: 30/11/2024</p>
          <p class="job-category">Category: Farming</p>
          <div class="job-ad-body">
            <p>Join our citrus harvest.</p>
            <a href="/apply">Apply here</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_labelled_fields() {
        let job = CostagroupExtractor.extract(PAGE, "https://careers.costagroup.com.au/job/7");

        assert_eq!(job.title.as_deref(), Some("Harvest Team Member"));
        assert_eq!(job.suburb.as_deref(), Some("Mildura, VIC"));
        assert_eq!(job.job_type.as_deref(), Some("Seasonal"));
        assert_eq!(job.start_date.as_deref(), Some("30/11/2024"));
        assert_eq!(job.category.as_deref(), Some("Farming"));
        assert_eq!(job.description.as_deref(), Some("Join our citrus harvest."));
        assert!(job.salary.is_none());
    }

    #[test]
    fn test_unlabelled_location_is_missing() {
        let job = CostagroupExtractor.extract(r#"<p class="job-location">Mildura</p>"#, "u");
        assert!(job.suburb.is_none());
    }
}
