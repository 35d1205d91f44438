//! APG Workforce.
//!
//! A single JavaScript-paginated search page, so the listing is walked in
//! a headless browser by clicking the "next" control.

mod descriptor;
mod parser;

pub use descriptor::{LISTING_URL, apgworkforce_descriptor};
pub use parser::ApgworkforceExtractor;
