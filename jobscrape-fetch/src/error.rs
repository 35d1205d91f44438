//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for page acquisition.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure (connect, TLS, body read, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Content looked like a block page.
    #[error("Blocked page at {url}: {reason}")]
    Blocked {
        /// Requested URL.
        url: String,
        /// Detector explanation.
        reason: String,
    },

    /// The browser driver stopped responding.
    #[error("Browser driver is dead: {0}")]
    DriverDead(String),

    /// The browser could not be started. Not retried.
    #[error("Failed to launch browser: {0}")]
    DriverLaunch(String),

    /// Browser navigation or page interaction failed.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL.
        url: String,
        /// Driver error text.
        message: String,
    },

    /// All attempts returned blocked or empty content.
    #[error("Page unavailable after {attempts} attempts: {url}")]
    PageUnavailable {
        /// Requested URL.
        url: String,
        /// Attempts made.
        attempts: u32,
    },

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An operation exceeded its deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The fetcher does not support the requested operation.
    #[error("{0} is not supported by this fetcher")]
    Unsupported(&'static str),
}

impl FetchError {
    /// Returns true for errors worth another attempt with the same fetcher.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::Blocked { .. }
            | Self::DriverDead(_)
            | Self::Navigation { .. }
            | Self::Timeout(_) => true,
            // 4xx other than 408/429 will not change on retry
            Self::HttpStatus { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            Self::DriverLaunch(_)
            | Self::PageUnavailable { .. }
            | Self::InvalidUrl(_)
            | Self::Unsupported(_) => false,
        }
    }

    /// Returns true for errors that must abort the whole acquisition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DriverLaunch(_) | Self::Unsupported(_))
    }

    /// Returns true for errors that no further attempt on the same URL can
    /// fix. Fatal errors are included.
    pub fn is_permanent(&self) -> bool {
        self.is_fatal() || matches!(self, Self::InvalidUrl(_))
    }
}
