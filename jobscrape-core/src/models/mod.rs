//! Domain models for jobscrape.
//!
//! ## Submodules
//!
//! - [`site`] - Supported recruiting sites
//! - [`job`] - Per-site job records and classification labels
//! - [`aggregated`] - Cross-site records
//! - [`table`] - Tabular export shape

mod aggregated;
mod job;
mod site;
mod table;

// Re-export everything at the models level
pub use aggregated::AggregatedRecord;
pub use job::{ClassificationLabel, JobRecord};
pub use site::SiteKind;
pub use table::{Table, format_date};

#[cfg(test)]
mod serde_tests;
