//! Workforce Australia descriptor.

use jobscrape_core::{SiteExtractor, SiteKind};

use super::api::{CATEGORIES, SEARCH_ENDPOINT, WorkforceAustraliaExtractor};
use crate::descriptor::{ApiPlan, Discovery, FetchPlan, SiteDescriptor};

/// Creates the Workforce Australia descriptor.
pub fn workforceaustralia_descriptor() -> SiteDescriptor {
    SiteDescriptor {
        id: SiteKind::WorkforceAustralia,
        home_url: "https://www.workforceaustralia.gov.au",
        aliases: &["wfa", "workforce"],
        fetch_plan: FetchPlan {
            // An empty result page is a legitimately tiny JSON body.
            min_content_len: Some(0),
            ..FetchPlan::http()
        },
        discovery: Discovery::Api(ApiPlan {
            endpoint: SEARCH_ENDPOINT.to_string(),
            categories: CATEGORIES.iter().map(|c| (*c).to_string()).collect(),
            page_size: 100,
            lookback_days: 7,
            max_pages: 50,
        }),
        extractor: || Box::new(WorkforceAustraliaExtractor) as Box<dyn SiteExtractor>,
    }
}
