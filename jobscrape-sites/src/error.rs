//! Site and harvest errors.

use jobscrape_core::CoreError;
use jobscrape_fetch::FetchError;
use thiserror::Error;

/// Errors that stop a harvest or publish phase.
///
/// Per-URL failures never surface here; they are logged and counted in the
/// phase report.
#[derive(Debug, Error)]
pub enum SitesError {
    /// Repository, classifier or exporter failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Fatal acquisition failure, such as a browser that cannot launch.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A site plan could not be built.
    #[error("Invalid site plan: {0}")]
    InvalidPlan(String),
}
