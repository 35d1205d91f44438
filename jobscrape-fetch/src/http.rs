//! HTTP fetch strategy with browser-like requests.
//!
//! Every attempt builds its own `reqwest` client so no connection, cookie
//! or TLS session state leaks from a failed attempt into the next one. The
//! client presents a realistic browser user agent, rotated per attempt, and
//! the header set a desktop browser sends for a top-level navigation.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

use crate::error::FetchError;
use crate::fetcher::{FetcherKind, Health, PageFetcher};
use crate::retry::{Backoff, RetryPolicy};
use crate::settings::HttpSettings;

/// Desktop user agents cycled across attempts.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

// ============================================================================
// HTTP Fetcher
// ============================================================================

/// Stateless HTTP fetcher that retries transport failures and transient
/// statuses (5xx, 408, 429) in place.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    policy: RetryPolicy,
    rotation: usize,
}

impl HttpFetcher {
    /// Creates a fetcher with a 60 s timeout and 5 attempts.
    pub fn new() -> Self {
        Self::from_settings(&HttpSettings::default())
    }

    /// Creates a fetcher from settings.
    pub fn from_settings(settings: &HttpSettings) -> Self {
        let backoff = if settings.retry_delay_secs == 0 {
            Backoff::None
        } else {
            Backoff::Fixed(Duration::from_secs(settings.retry_delay_secs))
        };

        Self {
            timeout: settings.timeout(),
            policy: RetryPolicy::new(settings.max_attempts).with_backoff(backoff),
            rotation: 0,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn user_agent_for(&self, attempt: u32) -> &'static str {
        let index = (self.rotation + attempt as usize) % USER_AGENTS.len();
        USER_AGENTS[index]
    }

    /// One request with a client that lives only for this attempt.
    async fn attempt_once(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        let user_agent = self.user_agent_for(attempt);
        let client = build_client(user_agent, self.timeout)?;

        debug!(attempt, user_agent, "GET request");
        let response = client.get(url).send().await?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn kind(&self) -> FetcherKind {
        FetcherKind::Http
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        let this = &*self;
        let outcome = self
            .policy
            .run(
                |attempt| this.attempt_once(url, attempt),
                FetchError::is_retryable,
            )
            .await;

        self.rotation = self.rotation.wrapping_add(outcome.attempts as usize);

        if outcome.exhausted {
            error!(attempts = outcome.attempts, "HTTP fetch failed on every attempt");
        }
        outcome.result
    }

    async fn reset(&mut self) {
        debug!("HTTP fetcher holds no session state, nothing to reset");
    }

    async fn health(&mut self) -> Health {
        Health::Unknown
    }
}

/// Builds a client that looks like a desktop browser navigation.
fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-AU,en-GB;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );

    Ok(Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_rotates_per_attempt() {
        let fetcher = HttpFetcher::new();
        assert_ne!(fetcher.user_agent_for(1), fetcher.user_agent_for(2));
        assert_eq!(
            fetcher.user_agent_for(1),
            fetcher.user_agent_for(1 + USER_AGENTS.len() as u32)
        );
    }

    #[test]
    fn test_settings_applied() {
        let settings = HttpSettings {
            timeout_secs: 5,
            max_attempts: 2,
            retry_delay_secs: 1,
        };
        let fetcher = HttpFetcher::from_settings(&settings);

        assert_eq!(fetcher.timeout, Duration::from_secs(5));
        assert_eq!(fetcher.policy.max_attempts, 2);
        assert_eq!(fetcher.policy.backoff, Backoff::Fixed(Duration::from_secs(1)));
    }

    #[test]
    fn test_client_builds() {
        assert!(build_client(USER_AGENTS[0], Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_permanent() {
        let mut fetcher = HttpFetcher::new();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(err.is_permanent());
        assert!(!err.is_fatal());
    }
}
