//! Costa Group careers.

mod descriptor;
mod parser;

pub use descriptor::{LISTING_URL, costagroup_descriptor};
pub use parser::CostagroupExtractor;
