//! Costa Group descriptor.

use jobscrape_core::{SiteExtractor, SiteKind};

use super::parser::CostagroupExtractor;
use crate::descriptor::{Discovery, FetchPlan, ListingPlan, SiteDescriptor};

/// Current vacancies page.
pub const LISTING_URL: &str = "https://careers.costagroup.com.au/jobs";

/// Creates the Costa Group descriptor.
pub fn costagroup_descriptor() -> SiteDescriptor {
    SiteDescriptor {
        id: SiteKind::Costagroup,
        home_url: "https://www.costagroup.com.au",
        aliases: &["costa"],
        fetch_plan: FetchPlan::http(),
        discovery: Discovery::Listing(ListingPlan {
            urls: vec![LISTING_URL.to_string()],
            link_selector: "a.job-link".to_string(),
            paginate: false,
        }),
        extractor: || Box::new(CostagroupExtractor) as Box<dyn SiteExtractor>,
    }
}
