//! Workforce Australia.
//!
//! The government job board exposes a JSON search API sorted newest first,
//! so records are built straight from search results and no detail pages
//! are fetched.

mod api;
mod descriptor;

pub use api::{
    CATEGORIES, CodeLabel, DETAILS_BASE, SEARCH_ENDPOINT, ScoredVacancy, SearchResponse, Vacancy,
    WorkforceAustraliaExtractor, parse_timestamp, search_url,
};
pub use descriptor::workforceaustralia_descriptor;
