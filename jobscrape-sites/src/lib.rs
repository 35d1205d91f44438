// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # jobscrape Sites
//!
//! Site implementations for jobscrape.
//!
//! Each site module contains:
//! - A descriptor with fetch and discovery plans
//! - A detail-page (or API) extractor
//!
//! ## Supported Sites
//!
//! - **Agri Labour**: HTTP listing pages, `a.name` detail links
//! - **APG Workforce**: browser-paginated job search
//! - **Costa Group**: HTTP careers board
//! - **Workforce Australia**: JSON vacancy search API
//!
//! ## Usage
//!
//! ```ignore
//! use jobscrape_sites::{SiteRegistry, harvest};
//! use jobscrape_core::SiteKind;
//!
//! let desc = SiteRegistry::get(SiteKind::Agrilabour).unwrap();
//! let mut session = desc.build_session(&settings, None);
//! let report = harvest(&desc.plan(), &mut session, &store).await?;
//! ```

pub mod descriptor;
pub mod error;
pub mod harvest;
pub mod html;
pub mod registry;

pub mod agrilabour;
pub mod apgworkforce;
pub mod costagroup;
pub mod workforceaustralia;

pub use descriptor::{ApiPlan, Discovery, FetchPlan, ListingPlan, SiteDescriptor};
pub use error::SitesError;
pub use harvest::{
    AGGREGATED_WINDOW_DAYS, AGGREGATED_WORKSHEET, ClassifyReport, HarvestPlan, HarvestReport,
    classify_pending, harvest, publish_aggregated, publish_site, rebuild_aggregated, site_table,
};
pub use registry::SiteRegistry;

pub use agrilabour::AgrilabourExtractor;
pub use apgworkforce::ApgworkforceExtractor;
pub use costagroup::CostagroupExtractor;
pub use workforceaustralia::WorkforceAustraliaExtractor;
