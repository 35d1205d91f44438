// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # jobscrape Core
//!
//! Shared data model and collaborator traits for the jobscrape workspace.
//!
//! Every other crate depends on this one. It holds:
//!
//! - Domain models (sites, job records, aggregated records, labels)
//! - Error types
//! - The traits the harvest loop talks to (extractor, repository,
//!   classifier, exporter)
//!
//! ## Key Types
//!
//! ### Records
//! - [`JobRecord`] - One normalized listing as stored per site
//! - [`AggregatedRecord`] - Cross-site projection used for publishing
//! - [`ClassificationLabel`] - Suitability label from the classifier
//!
//! ### Sites
//! - [`SiteKind`] - Enum of all supported recruiting sites
//!
//! ### Export
//! - [`Table`] - Header row plus string rows handed to an exporter

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Records
    AggregatedRecord,
    ClassificationLabel,
    JobRecord,
    // Sites
    SiteKind,
    // Export
    Table,
    format_date,
};

// Re-export traits
pub use traits::{Classifier, Exporter, InsertOutcome, JobRepository, SiteExtractor};
