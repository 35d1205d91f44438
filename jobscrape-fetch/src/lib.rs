// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # jobscrape Fetch
//!
//! Page acquisition for recruiting sites that push back on scrapers.
//!
//! ## Building Blocks
//!
//! - [`detector::BlockDetector`] - Decides whether content is a block page
//! - [`retry::RetryPolicy`] - Bounded retry with a caller-supplied predicate
//! - [`fetcher::PageFetcher`] - One raw fetch attempt, reset, liveness probe
//!
//! ## Strategies
//!
//! - [`http::HttpFetcher`] - Fresh browser-like HTTP client per attempt
//! - [`browser::BrowserFetcher`] - Lazily launched headless Chromium
//!
//! ## Acquisition
//!
//! [`session::AcquisitionSession`] owns one fetcher and runs the
//! retry/anti-blocking loop:
//!
//! ```ignore
//! use jobscrape_fetch::{AcquisitionSession, FetchSettings, HttpFetcher};
//!
//! let settings = FetchSettings::default();
//! let fetcher = HttpFetcher::from_settings(&settings.http);
//! let mut session = AcquisitionSession::from_settings(fetcher, &settings);
//!
//! let html = session.fetch("https://example.com/jobs").await?;
//! ```

pub mod browser;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod retry;
pub mod session;
pub mod settings;

// Re-export key types at crate root

// Errors
pub use error::FetchError;

// Detection & retry
pub use detector::{BlockDetector, BlockSignature, BlockVerdict};
pub use retry::{Attempt, Backoff, RetryOutcome, RetryPolicy};

// Fetchers
pub use browser::{
    BrowserDriver, BrowserFetcher, ChromiumDriver, ChromiumLauncher, DriverLauncher, find_chrome,
};
pub use fetcher::{FetcherKind, Health, PageFetcher};
pub use http::HttpFetcher;

// Session
pub use session::{AcquisitionSession, AcquisitionState, SessionStats};
pub use settings::{
    BrowserSettings, DetectorSettings, FetchSettings, HttpSettings, PaginationSettings,
};
