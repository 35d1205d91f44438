//! Site descriptor system.
//!
//! A descriptor contains the static configuration for a site:
//! - Metadata (display name, home page, CLI aliases)
//! - Fetch plan (which fetcher, block-detection overrides)
//! - Discovery plan (listing pages or a JSON API)
//! - The detail-page extractor

use jobscrape_core::{SiteExtractor, SiteKind};
use jobscrape_fetch::{
    AcquisitionSession, BlockDetector, BrowserFetcher, FetchSettings, FetcherKind, HttpFetcher,
    PageFetcher,
};

use crate::harvest::HarvestPlan;

// ============================================================================
// Site Descriptor
// ============================================================================

/// Complete descriptor for a site.
pub struct SiteDescriptor {
    /// Site identifier.
    pub id: SiteKind,
    /// Public home page.
    pub home_url: &'static str,
    /// Alternative CLI names.
    pub aliases: &'static [&'static str],
    /// How pages are acquired.
    pub fetch_plan: FetchPlan,
    /// How listings are discovered.
    pub discovery: Discovery,
    /// Builds the detail-page extractor.
    pub extractor: fn() -> Box<dyn SiteExtractor>,
}

impl SiteDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &'static str {
        self.id.cli_name()
    }

    /// Builds the fetcher this site is scraped with.
    pub fn build_fetcher(&self, settings: &FetchSettings) -> Box<dyn PageFetcher> {
        match self.fetch_plan.fetcher {
            FetcherKind::Http => Box::new(HttpFetcher::from_settings(&settings.http)),
            FetcherKind::Browser => Box::new(BrowserFetcher::new(settings.browser.clone())),
        }
    }

    /// Builds an acquisition session for this site.
    ///
    /// `min_content_len` overrides the site default, which overrides the
    /// global detector setting.
    pub fn build_session(
        &self,
        settings: &FetchSettings,
        min_content_len: Option<usize>,
    ) -> AcquisitionSession {
        let mut detector = BlockDetector::from_settings(&settings.detector);
        if let Some(min) = min_content_len.or(self.fetch_plan.min_content_len) {
            detector = detector.with_min_content_len(min);
        }

        AcquisitionSession::from_settings(self.build_fetcher(settings), settings)
            .with_detector(detector)
    }

    /// Builds the default harvest plan.
    pub fn plan(&self) -> HarvestPlan {
        HarvestPlan::new(self.id, self.discovery.clone(), (self.extractor)())
    }
}

// ============================================================================
// Fetch Plan
// ============================================================================

/// Page acquisition configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// Fetcher strategy.
    pub fetcher: FetcherKind,
    /// Site-specific minimum content length for block detection.
    pub min_content_len: Option<usize>,
}

impl FetchPlan {
    /// Plain HTTP with the global detector settings.
    pub const fn http() -> Self {
        Self {
            fetcher: FetcherKind::Http,
            min_content_len: None,
        }
    }

    /// Headless browser with the global detector settings.
    pub const fn browser() -> Self {
        Self {
            fetcher: FetcherKind::Browser,
            min_content_len: None,
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// How a site's listings are discovered.
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    /// Detail links parsed from HTML listing pages.
    Listing(ListingPlan),
    /// Records built directly from a paged JSON search API.
    Api(ApiPlan),
}

/// HTML listing pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPlan {
    /// Listing pages, visited in order.
    pub urls: Vec<String>,
    /// CSS selector of detail links.
    pub link_selector: String,
    /// Follow the in-page "next" control (browser fetchers only).
    pub paginate: bool,
}

/// Paged JSON search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPlan {
    /// Search endpoint.
    pub endpoint: String,
    /// Search terms; each is paged separately.
    pub categories: Vec<String>,
    /// Results per page.
    pub page_size: u32,
    /// Look-back window when nothing is stored for a category.
    pub lookback_days: i64,
    /// Upper bound on pages per category.
    pub max_pages: u32,
}
