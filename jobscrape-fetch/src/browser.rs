//! Headless browser fetch strategy.
//!
//! A [`BrowserFetcher`] owns at most one live browser (a [`BrowserDriver`],
//! normally a [`ChromiumDriver`]). The browser is launched lazily on the
//! first fetch, probed before every navigation, and torn down after a failed
//! navigation so the next call starts from a fresh process.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::fetcher::{FetcherKind, Health, PageFetcher};
use crate::settings::BrowserSettings;

/// Flags that hide the most obvious automation markers and keep Chromium
/// quiet inside containers.
const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
    "--disable-breakpad",
    "--disable-crash-reporter",
    "--disable-in-process-stack-traces",
    "--noerrdialogs",
    "--disable-extensions",
    "--disable-logging",
];

/// Poll interval while waiting for an element.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// Chrome Discovery
// ============================================================================

/// Finds a Chrome or Chromium executable.
///
/// Order: `CHROME_BIN`, then well-known binary names on `PATH`, then the
/// standard macOS install location.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

fn resolve_executable(configured: Option<&Path>) -> Result<PathBuf, FetchError> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(FetchError::DriverLaunch(format!(
            "configured browser executable does not exist: {}",
            path.display()
        ))),
        None => find_chrome().ok_or_else(|| {
            FetchError::DriverLaunch(
                "no Chrome/Chromium found; set CHROME_BIN or browser.executable".to_string(),
            )
        }),
    }
}

// ============================================================================
// Driver Seam
// ============================================================================

/// One live browser with a single active tab.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Checks that the tab still answers within `timeout`.
    async fn probe(&self, timeout: Duration) -> Health;

    /// Loads `url` and returns the rendered HTML.
    async fn navigate(&self, url: &str) -> Result<String, FetchError>;

    /// Returns true if `selector` matches an element.
    async fn has_element(&self, selector: &str) -> bool;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), FetchError>;

    /// HTML of the current document.
    async fn content(&self) -> Result<String, FetchError>;

    /// Shuts the browser down. Errors are swallowed.
    async fn close(&mut self);
}

/// Starts browsers for a [`BrowserFetcher`].
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Launches a browser configured by `settings`.
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn BrowserDriver>, FetchError>;
}

// ============================================================================
// Chromium Driver
// ============================================================================

/// Launches headless Chromium through chromiumoxide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn BrowserDriver>, FetchError> {
        Ok(Box::new(ChromiumDriver::launch(settings).await?))
    }
}

/// One launched Chromium plus its active tab.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    async fn launch(settings: &BrowserSettings) -> Result<Self, FetchError> {
        let executable = resolve_executable(settings.executable.as_deref())?;
        info!(executable = %executable.display(), "Launching headless browser");

        let config = BrowserConfig::builder()
            .chrome_executable(executable)
            .args(launch_args(settings))
            .build()
            .map_err(FetchError::DriverLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::DriverLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut session_browser = browser;
                let _ = session_browser.close().await;
                handler.abort();
                return Err(FetchError::DriverLaunch(format!("failed to open tab: {e}")));
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn probe(&self, timeout: Duration) -> Health {
        match tokio::time::timeout(timeout, self.page.url()).await {
            Ok(Ok(_)) => Health::Alive,
            Ok(Err(e)) => {
                debug!(error = %e, "Liveness probe failed");
                Health::Dead
            }
            Err(_) => Health::Unknown,
        }
    }

    async fn navigate(&self, url: &str) -> Result<String, FetchError> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            self.page.content().await
        };

        load.await.map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn has_element(&self, selector: &str) -> bool {
        self.page.find_element(selector).await.is_ok()
    }

    async fn click(&self, selector: &str) -> Result<(), FetchError> {
        let click = async {
            let element = self.page.find_element(selector).await?;
            element.click().await?;
            Ok::<_, CdpError>(())
        };

        click.await.map_err(|e| FetchError::Navigation {
            url: selector.to_string(),
            message: format!("click failed: {e}"),
        })
    }

    async fn content(&self) -> Result<String, FetchError> {
        self.page.content().await.map_err(|e| FetchError::Navigation {
            url: String::new(),
            message: format!("reading page content failed: {e}"),
        })
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            debug!(error = %e, "Browser close failed, killing process");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "Waiting for browser exit failed");
        }
        self.handler.abort();
    }
}

/// Full launch flag list for `settings`.
fn launch_args(settings: &BrowserSettings) -> Vec<String> {
    STEALTH_ARGS
        .iter()
        .map(|s| (*s).to_string())
        .chain(std::iter::once(format!(
            "--user-agent={}",
            settings.user_agent
        )))
        .chain(settings.extra_args.iter().cloned())
        .collect()
}

// ============================================================================
// Browser Fetcher
// ============================================================================

/// Fetcher backed by one headless browser, created on demand.
pub struct BrowserFetcher {
    settings: BrowserSettings,
    launcher: Box<dyn DriverLauncher>,
    driver: Option<Box<dyn BrowserDriver>>,
    launches: u32,
}

impl BrowserFetcher {
    /// Creates a Chromium fetcher. No browser is started until the first
    /// fetch.
    pub fn new(settings: BrowserSettings) -> Self {
        Self::with_launcher(settings, ChromiumLauncher)
    }

    /// Creates a fetcher that starts browsers through `launcher`.
    pub fn with_launcher(settings: BrowserSettings, launcher: impl DriverLauncher + 'static) -> Self {
        Self {
            settings,
            launcher: Box::new(launcher),
            driver: None,
            launches: 0,
        }
    }

    /// Number of browsers launched so far.
    pub fn launch_count(&self) -> u32 {
        self.launches
    }

    /// Returns true if a driver is currently held.
    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    async fn probe(&self) -> Health {
        match &self.driver {
            Some(driver) => driver.probe(self.settings.probe_timeout()).await,
            None => Health::Dead,
        }
    }

    /// Returns a live driver, replacing a held one that fails the probe.
    async fn ensure_driver(&mut self) -> Result<&dyn BrowserDriver, FetchError> {
        if self.driver.is_some() {
            let health = self.probe().await;
            if !health.is_alive() {
                warn!(?health, "Browser driver not responsive, recreating");
                self.teardown().await;
            }
        }

        if self.driver.is_none() {
            let driver = self.launcher.launch(&self.settings).await?;
            self.launches += 1;
            self.driver = Some(driver);
        }

        self.driver()
    }

    /// Drops the driver, swallowing any error from closing it.
    async fn teardown(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            debug!("Tearing down browser driver");
            driver.close().await;
        }
    }

    fn driver(&self) -> Result<&dyn BrowserDriver, FetchError> {
        self.driver
            .as_deref()
            .ok_or_else(|| FetchError::DriverDead("no browser driver".to_string()))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn kind(&self) -> FetcherKind {
        FetcherKind::Browser
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        let timeout = self.settings.navigation_timeout();
        let driver = self.ensure_driver().await?;

        debug!("Loading page");
        let navigation = tokio::time::timeout(timeout, driver.navigate(url)).await;

        match navigation {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => {
                warn!(error = %e, "Navigation failed, discarding driver");
                self.teardown().await;
                Err(e)
            }
            Err(_) => {
                warn!(timeout = ?timeout, "Navigation timed out, discarding driver");
                self.teardown().await;
                Err(FetchError::Timeout(timeout))
            }
        }
    }

    async fn reset(&mut self) {
        self.teardown().await;
    }

    async fn health(&mut self) -> Health {
        self.probe().await
    }

    fn supports_pagination(&self) -> bool {
        true
    }

    async fn wait_for_control(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, FetchError> {
        let driver = self.driver()?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if driver.has_element(selector).await {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_control(&mut self, selector: &str) -> Result<bool, FetchError> {
        Ok(self.driver()?.has_element(selector).await)
    }

    async fn click_control(&mut self, selector: &str) -> Result<(), FetchError> {
        self.driver()?.click(selector).await
    }

    async fn current_content(&mut self) -> Result<String, FetchError> {
        self.driver()?.content().await
    }

    async fn shutdown(&mut self) {
        self.teardown().await;
    }
}
