// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Jobscrape Services
//!
//! Integrations with external services:
//!
//! - [`OpenAiClassifier`] labels listings through the OpenAI chat API
//! - [`SheetsExporter`] overwrites Google Sheets worksheets, authenticating
//!   with a service-account JWT or a static token
//! - [`CsvExporter`] writes one CSV file per worksheet
//! - [`ExportTargets`] publishes to every configured destination

pub mod classifier;
pub mod csv_export;
pub mod error;
pub mod sheets;
pub mod targets;

pub use classifier::{DEFAULT_MODEL, OPENAI_ENDPOINT, OpenAiClassifier, SCREENING_PROMPT};
pub use csv_export::CsvExporter;
pub use error::ServiceError;
pub use sheets::{ServiceAccountKey, SheetsExporter, TokenSource};
pub use targets::ExportTargets;
