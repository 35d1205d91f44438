//! Block-aware page acquisition.
//!
//! An [`AcquisitionSession`] owns one [`PageFetcher`] and drives it through
//! the retry state machine:
//!
//! ```text
//!            ┌──────────── reset ◄───────────┐
//!            ▼                               │
//!   ──► Fetching ──► detector ──blocked──► Blocked ──cap reached──► Exhausted
//!                       │
//!                     clean
//!                       ▼
//!                   Succeeded
//! ```
//!
//! A fetcher error counts as empty content, which the detector always
//! flags, so transport failures and block pages share one path. Only fatal
//! errors (the browser cannot start at all) bypass the loop.
//!
//! For sites that paginate in place, [`AcquisitionSession::fetch_all_pages`]
//! follows a "next page" control after the first page has been acquired.

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use crate::detector::BlockDetector;
use crate::error::FetchError;
use crate::fetcher::{FetcherKind, PageFetcher};
use crate::retry::{Attempt, RetryPolicy};
use crate::settings::{FetchSettings, PaginationSettings};

// ============================================================================
// State & Stats
// ============================================================================

/// Where the session is in the acquisition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionState {
    /// No fetch has run yet.
    Idle,
    /// An attempt is in flight.
    Fetching,
    /// The last attempt returned a block page; a retry follows.
    Blocked,
    /// Clean content was returned.
    Succeeded,
    /// Every attempt was blocked.
    Exhausted,
    /// A fatal fetcher error ended the call.
    Failed,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Blocked => "blocked",
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters accumulated over a session's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// `fetch` calls.
    pub fetches: u64,
    /// Fetcher attempts across all calls.
    pub attempts: u64,
    /// Fetcher resets after blocked attempts.
    pub resets: u64,
    /// Calls that ended in [`FetchError::PageUnavailable`].
    pub exhausted: u64,
    /// Pages collected by `fetch_all_pages`.
    pub pages: u64,
}

// ============================================================================
// Block-Aware Attempt
// ============================================================================

/// One fetch attempt judged by the detector; resets the fetcher when blocked.
struct BlockAwareAttempt<'a, F> {
    fetcher: &'a mut F,
    detector: &'a BlockDetector,
    url: &'a str,
    state: &'a mut AcquisitionState,
    resets: &'a mut u32,
}

impl<F: PageFetcher> Attempt for BlockAwareAttempt<'_, F> {
    type Output = String;
    type Error = FetchError;

    async fn attempt(&mut self, attempt: u32) -> Result<String, FetchError> {
        *self.state = AcquisitionState::Fetching;

        let content = match self.fetcher.fetch(self.url).await {
            Ok(content) => content,
            Err(e) if e.is_permanent() => {
                *self.state = AcquisitionState::Failed;
                return Err(e);
            }
            Err(e) => {
                warn!(attempt, error = %e, "Fetcher failed, treating as empty content");
                String::new()
            }
        };

        let verdict = self.detector.inspect(&content);
        if !verdict.is_blocked() {
            *self.state = AcquisitionState::Succeeded;
            return Ok(content);
        }

        *self.state = AcquisitionState::Blocked;
        warn!(attempt, reason = %verdict, "Blocked page, resetting fetcher");
        self.fetcher.reset().await;
        *self.resets += 1;

        Err(FetchError::Blocked {
            url: self.url.to_string(),
            reason: verdict.to_string(),
        })
    }
}

// ============================================================================
// Acquisition Session
// ============================================================================

/// Owns a fetcher and acquires pages through block detection and retries.
pub struct AcquisitionSession<F = Box<dyn PageFetcher>> {
    fetcher: F,
    detector: BlockDetector,
    policy: RetryPolicy,
    pagination: PaginationSettings,
    state: AcquisitionState,
    stats: SessionStats,
}

impl<F: PageFetcher> AcquisitionSession<F> {
    /// Creates a session with a 5-attempt cap and default pagination.
    pub fn new(fetcher: F, detector: BlockDetector) -> Self {
        Self {
            fetcher,
            detector,
            policy: RetryPolicy::new(5),
            pagination: PaginationSettings::default(),
            state: AcquisitionState::Idle,
            stats: SessionStats::default(),
        }
    }

    /// Creates a session configured from settings.
    pub fn from_settings(fetcher: F, settings: &FetchSettings) -> Self {
        Self::new(fetcher, BlockDetector::from_settings(&settings.detector))
            .with_policy(RetryPolicy::new(settings.max_attempts))
            .with_pagination(settings.pagination.clone())
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides pagination settings.
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationSettings) -> Self {
        self.pagination = pagination;
        self
    }

    /// Replaces the detector.
    #[must_use]
    pub fn with_detector(mut self, detector: BlockDetector) -> Self {
        self.detector = detector;
        self
    }

    /// State after the most recent attempt.
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The detector in use.
    pub fn detector(&self) -> &BlockDetector {
        &self.detector
    }

    /// The owned fetcher's kind.
    pub fn fetcher_kind(&self) -> FetcherKind {
        self.fetcher.kind()
    }

    /// Borrows the owned fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Acquires `url`, retrying blocked attempts up to the cap.
    ///
    /// # Errors
    ///
    /// [`FetchError::PageUnavailable`] when every attempt was blocked, or
    /// the fatal fetcher error that stopped the loop.
    #[instrument(skip(self), fields(url = %url, fetcher = %self.fetcher.kind()))]
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.stats.fetches += 1;

        let mut resets = 0;
        let op = BlockAwareAttempt {
            fetcher: &mut self.fetcher,
            detector: &self.detector,
            url,
            state: &mut self.state,
            resets: &mut resets,
        };
        let outcome = self
            .policy
            .run(op, |e: &FetchError| matches!(e, FetchError::Blocked { .. }))
            .await;

        self.stats.attempts += u64::from(outcome.attempts);
        self.stats.resets += u64::from(resets);

        match outcome.result {
            Ok(content) => {
                debug!(attempts = outcome.attempts, bytes = content.len(), "Page acquired");
                Ok(content)
            }
            Err(_) if outcome.exhausted => {
                self.state = AcquisitionState::Exhausted;
                self.stats.exhausted += 1;
                error!(attempts = outcome.attempts, "Page unavailable after all attempts");
                Err(FetchError::PageUnavailable {
                    url: url.to_string(),
                    attempts: outcome.attempts,
                })
            }
            Err(e) => {
                self.state = AcquisitionState::Failed;
                Err(e)
            }
        }
    }

    /// Acquires `url`, then follows the next-page control and returns
    /// every page in order.
    ///
    /// Pagination ends normally when the control is gone, when the first
    /// wait for it times out, when a click or capture fails, or when the
    /// page cap is reached. The result always holds at least the first page.
    ///
    /// # Errors
    ///
    /// Only errors from acquiring the first page.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_all_pages(&mut self, url: &str) -> Result<Vec<String>, FetchError> {
        let first = self.fetch(url).await?;
        let mut pages = vec![first];

        if !self.fetcher.supports_pagination() {
            debug!("Fetcher cannot paginate, returning first page");
            self.stats.pages += 1;
            return Ok(pages);
        }

        let selector = self.pagination.next_selector.clone();
        match self
            .fetcher
            .wait_for_control(&selector, self.pagination.initial_wait())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    selector = %selector,
                    wait = ?self.pagination.initial_wait(),
                    "Next-page control did not appear within the initial wait, keeping single page"
                );
                self.stats.pages += 1;
                return Ok(pages);
            }
            Err(e) => {
                warn!(error = %e, "Could not look for next-page control");
                self.stats.pages += 1;
                return Ok(pages);
            }
        }

        loop {
            if pages.len() >= self.pagination.max_pages {
                warn!(max_pages = self.pagination.max_pages, "Page cap reached, stopping pagination");
                break;
            }

            debug!(page = pages.len() + 1, "Clicking next-page control");
            if let Err(e) = self.fetcher.click_control(&selector).await {
                warn!(error = %e, "Could not click next-page control");
                break;
            }

            tokio::time::sleep(self.pagination.settle()).await;

            match self.fetcher.current_content().await {
                Ok(content) => pages.push(content),
                Err(e) => {
                    warn!(error = %e, "Could not capture page after click");
                    break;
                }
            }

            match self.fetcher.find_control(&selector).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Next-page control gone, last page reached");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Could not relocate next-page control");
                    break;
                }
            }
        }

        self.stats.pages += pages.len() as u64;
        info!(pages = pages.len(), "Collected paginated content");
        Ok(pages)
    }

    /// Releases the fetcher's resources.
    pub async fn close(&mut self) {
        self.fetcher.shutdown().await;
    }

    /// Returns the owned fetcher.
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }
}
