//! Tunables for page acquisition.
//!
//! Every field has a default, so a partial JSON object in the config file
//! only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::detector::BlockSignature;

/// User agent presented by the browser strategy.
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for an acquisition session and its fetchers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSettings {
    /// Attempts per URL before the page is declared unavailable.
    pub max_attempts: u32,
    /// Block detection knobs.
    pub detector: DetectorSettings,
    /// HTTP strategy knobs.
    pub http: HttpSettings,
    /// Browser strategy knobs.
    pub browser: BrowserSettings,
    /// Pagination-follow knobs.
    pub pagination: PaginationSettings,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            detector: DetectorSettings::default(),
            http: HttpSettings::default(),
            browser: BrowserSettings::default(),
            pagination: PaginationSettings::default(),
        }
    }
}

// ============================================================================
// Detector Settings
// ============================================================================

/// Block detection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorSettings {
    /// Content shorter than this many characters counts as blocked.
    /// Zero disables the size check.
    pub min_content_len: usize,
    /// Known block-page phrases, checked in order.
    pub signatures: Vec<BlockSignature>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_content_len: 2000,
            signatures: BlockSignature::defaults(),
        }
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP-evasion strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Attempts per fetch on network failures.
    pub max_attempts: u32,
    /// Delay between attempts in seconds. Zero retries immediately.
    pub retry_delay_secs: u64,
}

impl HttpSettings {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_attempts: 5,
            retry_delay_secs: 0,
        }
    }
}

// ============================================================================
// Browser Settings
// ============================================================================

/// Headless browser strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowserSettings {
    /// Explicit Chrome/Chromium executable. `CHROME_BIN` and `PATH` are
    /// searched when unset.
    pub executable: Option<PathBuf>,
    /// User agent override.
    pub user_agent: String,
    /// Navigation timeout in seconds.
    pub navigation_timeout_secs: u64,
    /// Liveness probe timeout in seconds.
    pub probe_timeout_secs: u64,
    /// Extra command-line flags appended after the built-in ones.
    pub extra_args: Vec<String>,
}

impl BrowserSettings {
    /// Navigation timeout as a duration.
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Probe timeout as a duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            user_agent: DEFAULT_BROWSER_USER_AGENT.to_string(),
            navigation_timeout_secs: 60,
            probe_timeout_secs: 5,
            extra_args: Vec::new(),
        }
    }
}

// ============================================================================
// Pagination Settings
// ============================================================================

/// Settings for following a "next page" control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaginationSettings {
    /// CSS selector of the next-page control.
    pub next_selector: String,
    /// How long to wait for the control on the first page, in seconds.
    pub initial_wait_secs: u64,
    /// Pause after each click, in seconds.
    pub settle_secs: u64,
    /// Hard cap on collected pages.
    pub max_pages: usize,
}

impl PaginationSettings {
    /// Initial wait as a duration.
    pub fn initial_wait(&self) -> Duration {
        Duration::from_secs(self.initial_wait_secs)
    }

    /// Settle pause as a duration.
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            next_selector: ".next".to_string(),
            initial_wait_secs: 10,
            settle_secs: 5,
            max_pages: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = FetchSettings::default();
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.detector.min_content_len, 2000);
        assert_eq!(settings.detector.signatures.len(), 4);
        assert_eq!(settings.http.timeout(), Duration::from_secs(60));
        assert_eq!(settings.pagination.next_selector, ".next");
        assert_eq!(settings.pagination.initial_wait(), Duration::from_secs(10));
        assert_eq!(settings.pagination.settle(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "max_attempts": 3, "pagination": { "settle_secs": 1 } }"#;
        let settings: FetchSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.pagination.settle_secs, 1);
        assert_eq!(settings.pagination.initial_wait_secs, 10);
        assert_eq!(settings.http.max_attempts, 5);
    }
}
