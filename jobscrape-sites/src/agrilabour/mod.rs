//! Agri Labour Australia.
//!
//! Casual farm positions, three listing pages fetched over plain HTTP.

mod descriptor;
mod parser;

pub use descriptor::{LISTING_PAGES, agrilabour_descriptor, listing_url};
pub use parser::AgrilabourExtractor;
