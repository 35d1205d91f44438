//! APG Workforce descriptor.

use jobscrape_core::{SiteExtractor, SiteKind};

use super::parser::ApgworkforceExtractor;
use crate::descriptor::{Discovery, FetchPlan, ListingPlan, SiteDescriptor};

/// Job search page.
pub const LISTING_URL: &str = "https://www.apgworkforce.com.au/job-search";

/// Creates the APG Workforce descriptor.
pub fn apgworkforce_descriptor() -> SiteDescriptor {
    SiteDescriptor {
        id: SiteKind::Apgworkforce,
        home_url: "https://www.apgworkforce.com.au",
        aliases: &["apg"],
        fetch_plan: FetchPlan::browser(),
        discovery: Discovery::Listing(ListingPlan {
            urls: vec![LISTING_URL.to_string()],
            link_selector: ".ja-job-list .title a, .ja-job-list a.job-link".to_string(),
            paginate: true,
        }),
        extractor: || Box::new(ApgworkforceExtractor) as Box<dyn SiteExtractor>,
    }
}
