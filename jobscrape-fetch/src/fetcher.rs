//! Page fetcher trait and shared types.
//!
//! A fetcher performs raw attempts. It knows nothing about block pages or
//! retry caps; the [`AcquisitionSession`](crate::AcquisitionSession) layers
//! those on top. Two strategies exist:
//!
//! - [`HttpFetcher`](crate::HttpFetcher) - stateless browser-mimicking HTTP
//! - [`BrowserFetcher`](crate::BrowserFetcher) - one headless Chromium per fetcher
//!
//! Pagination hooks default to "unsupported" so stateless fetchers only
//! implement the core methods.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::FetchError;

// ============================================================================
// Fetcher Kind
// ============================================================================

/// The mechanism a fetcher uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherKind {
    /// Plain HTTP with browser-like headers.
    Http,
    /// Headless browser automation.
    Browser,
}

impl FetcherKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Browser => "Browser",
        }
    }
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Health
// ============================================================================

/// Liveness of a fetcher's underlying client or driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Health {
    /// The driver answered a probe.
    Alive,
    /// The driver is gone or failed a probe.
    Dead,
    /// No probe is possible or the probe timed out.
    Unknown,
}

impl Health {
    /// Returns true only for a confirmed live driver.
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

// ============================================================================
// Page Fetcher Trait
// ============================================================================

/// Retrieves raw page content for a URL.
#[async_trait]
pub trait PageFetcher: Send {
    /// Mechanism used by this fetcher.
    fn kind(&self) -> FetcherKind;

    /// Performs one fetch of `url`.
    ///
    /// Implementations may retry internally on transport failures but must
    /// not inspect the content for block pages.
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError>;

    /// Discards the underlying client or driver so the next fetch starts
    /// fresh. Never fails; teardown problems are logged.
    async fn reset(&mut self);

    /// Probes the underlying driver.
    async fn health(&mut self) -> Health;

    /// Returns true if the pagination hooks are implemented.
    fn supports_pagination(&self) -> bool {
        false
    }

    /// Waits up to `timeout` for `selector` on the current page.
    /// `Ok(false)` means the wait timed out.
    async fn wait_for_control(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, FetchError> {
        Err(FetchError::Unsupported("pagination"))
    }

    /// Checks once, without waiting, whether `selector` is on the page.
    async fn find_control(&mut self, _selector: &str) -> Result<bool, FetchError> {
        Err(FetchError::Unsupported("pagination"))
    }

    /// Clicks the first element matching `selector`.
    async fn click_control(&mut self, _selector: &str) -> Result<(), FetchError> {
        Err(FetchError::Unsupported("pagination"))
    }

    /// Returns the content of the page currently loaded.
    async fn current_content(&mut self) -> Result<String, FetchError> {
        Err(FetchError::Unsupported("pagination"))
    }

    /// Releases every resource. Called once when the owner is done.
    async fn shutdown(&mut self) {
        self.reset().await;
    }
}

#[async_trait]
impl PageFetcher for Box<dyn PageFetcher> {
    fn kind(&self) -> FetcherKind {
        (**self).kind()
    }

    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }

    async fn reset(&mut self) {
        (**self).reset().await;
    }

    async fn health(&mut self) -> Health {
        (**self).health().await
    }

    fn supports_pagination(&self) -> bool {
        (**self).supports_pagination()
    }

    async fn wait_for_control(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, FetchError> {
        (**self).wait_for_control(selector, timeout).await
    }

    async fn find_control(&mut self, selector: &str) -> Result<bool, FetchError> {
        (**self).find_control(selector).await
    }

    async fn click_control(&mut self, selector: &str) -> Result<(), FetchError> {
        (**self).click_control(selector).await
    }

    async fn current_content(&mut self) -> Result<String, FetchError> {
        (**self).current_content().await
    }

    async fn shutdown(&mut self) {
        (**self).shutdown().await;
    }
}
