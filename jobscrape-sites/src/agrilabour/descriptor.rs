//! Agri Labour descriptor.

use jobscrape_core::{SiteExtractor, SiteKind};

use super::parser::AgrilabourExtractor;
use crate::descriptor::{Discovery, FetchPlan, ListingPlan, SiteDescriptor};

/// Number of listing pages visited per run.
pub const LISTING_PAGES: u32 = 3;

const BASE: &str = "https://www.agrilabour.com.au/candidates/current-positions";

/// Listing page `page` (1-based) of casual positions.
pub fn listing_url(page: u32) -> String {
    if page == 1 {
        format!("{BASE}/?status=casual&search=1")
    } else {
        format!("{BASE}/page/{page}/?status=casual&search=1")
    }
}

/// Creates the Agri Labour Australia descriptor.
pub fn agrilabour_descriptor() -> SiteDescriptor {
    SiteDescriptor {
        id: SiteKind::Agrilabour,
        home_url: "https://www.agrilabour.com.au",
        aliases: &["agri"],
        fetch_plan: FetchPlan::http(),
        discovery: Discovery::Listing(ListingPlan {
            urls: (1..=LISTING_PAGES).map(listing_url).collect(),
            link_selector: "a.name".to_string(),
            paginate: false,
        }),
        extractor: || Box::new(AgrilabourExtractor) as Box<dyn SiteExtractor>,
    }
}
