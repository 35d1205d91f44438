//! APG Workforce detail page parser.

use jobscrape_core::{JobRecord, SiteExtractor, SiteKind};
use scraper::Html;
use tracing::debug;

use crate::html::{
    NON_DESCRIPTION_TAGS, block_text, element_text, first, first_text, require, selector,
};

/// Board attribute id of the location item.
const LOCATION_ATTR: &str = "22203";
/// Board attribute id of the work type item.
const WORK_TYPE_ATTR: &str = "22204";

/// Extractor for APG Workforce detail pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApgworkforceExtractor;

impl SiteExtractor for ApgworkforceExtractor {
    fn site(&self) -> SiteKind {
        SiteKind::Apgworkforce
    }

    fn extract(&self, content: &str, source_url: &str) -> JobRecord {
        debug!(url = source_url, len = content.len(), "Parsing APG Workforce job");

        let doc = Html::parse_document(content);

        let mut job = JobRecord::new(SiteKind::Apgworkforce, source_url);
        job.title = require(
            "title",
            source_url,
            first_text(&doc, ".ja-job-details h2").and_then(|h| {
                let title = h.split('-').next()?.trim().to_string();
                (!title.is_empty()).then_some(title)
            }),
        );
        job.description = require(
            "description",
            source_url,
            first(&doc, "div.description").and_then(|el| block_text(el, NON_DESCRIPTION_TAGS)),
        );
        job.suburb = require(
            "suburb",
            source_url,
            first_text(&doc, &format!(r#"li[data-id="{LOCATION_ATTR}"]"#)),
        );
        job.job_type = require(
            "job_type",
            source_url,
            first_text(&doc, &format!(r#"li[data-id="{WORK_TYPE_ATTR}"]"#)),
        );
        job.salary = require("salary", source_url, salary(&doc));
        job
    }
}

/// Third bullet point of the summary.
fn salary(doc: &Html) -> Option<String> {
    let bullets = first(doc, ".bullet-points")?;
    let item = selector("li")?;
    bullets.select(&item).nth(2).and_then(element_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="ja-job-details">
            <h2>Warehouse Storeperson - Dandenong</h2>
            <ul class="bullet-points">
              <li>Dandenong South</li>
              <li>Casual</li>
              <li>$30 - $32 per hour</li>
            </ul>
            <ul class="classifications">
              <li data-id="22203">Melbourne</li>
              <li data-id="22204">Casual</li>
            </ul>
            <div class="description">
              <p>Pick and pack orders.</p>
              <button>Apply</button>
              <p>Forklift licence <a href="/licence">details</a> preferred.</p>
              <iframe src="https://video.example.com"></iframe>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_fields() {
        let job = ApgworkforceExtractor.extract(PAGE, "https://www.apgworkforce.com.au/job/9");

        assert_eq!(job.title.as_deref(), Some("Warehouse Storeperson"));
        assert_eq!(job.suburb.as_deref(), Some("Melbourne"));
        assert_eq!(job.job_type.as_deref(), Some("Casual"));
        assert_eq!(job.salary.as_deref(), Some("$30 - $32 per hour"));
        assert_eq!(
            job.description.as_deref(),
            Some("Pick and pack orders.\nForklift licence\npreferred.")
        );
        assert!(job.state.is_none());
    }

    #[test]
    fn test_short_bullet_list_has_no_salary() {
        let html = r#"<ul class="bullet-points"><li>A</li><li>B</li></ul>"#;
        let job = ApgworkforceExtractor.extract(html, "u");
        assert!(job.salary.is_none());
        assert!(job.title.is_none());
    }
}
