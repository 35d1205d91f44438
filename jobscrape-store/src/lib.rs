// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # jobscrape Store
//!
//! Persistence and configuration for jobscrape.
//!
//! This crate provides:
//!
//! - **JobStore**: SQLite implementation of the job repository
//! - **Config**: JSON configuration with environment overrides
//! - **Persistence**: Default paths and atomic JSON writes
//!
//! ## Usage
//!
//! ```ignore
//! use jobscrape_store::{Config, JobStore};
//!
//! let mut config = Config::load()?;
//! config.apply_env();
//!
//! let store = JobStore::open(&config.database_path())?;
//! ```

pub mod config;
pub mod error;
pub mod job_store;
pub mod persistence;

pub use config::{ClassifierConfig, Config, ExportConfig, LogConfig, SheetsConfig, SiteConfig};
pub use error::StoreError;
pub use job_store::JobStore;
pub use persistence::{
    default_config_dir, default_config_path, default_data_dir, default_database_path,
    default_log_dir, ensure_parent_dir, load_json, save_json,
};

#[cfg(test)]
mod persistence_tests;
