//! JSON output formatting.

use anyhow::Result;
use jobscrape_core::SiteKind;
use jobscrape_fetch::SessionStats;
use jobscrape_sites::{ClassifyReport, Discovery, HarvestReport, SiteDescriptor};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Outcome of the phases run for one site.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRunOutput {
    pub site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harvest: Option<HarvestReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition: Option<SessionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classify: Option<ClassifyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_rows: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SiteRunOutput {
    /// Empty outcome for `site`.
    pub fn new(site: SiteKind) -> Self {
        Self::named(site.cli_name())
    }

    /// Empty outcome for a named target such as the aggregated worksheet.
    pub fn named(name: &str) -> Self {
        Self {
            site: name.to_string(),
            harvest: None,
            acquisition: None,
            classify: None,
            exported_rows: None,
            errors: Vec::new(),
        }
    }

    /// Returns true if any phase failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Site info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfoOutput {
    pub cli_name: String,
    pub display_name: String,
    pub home_url: String,
    pub fetcher: String,
    pub discovery: String,
    pub aliases: Vec<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<usize>,
}

impl SiteInfoOutput {
    /// Builds the output for a descriptor.
    pub fn new(desc: &SiteDescriptor, enabled: bool, stored: Option<usize>) -> Self {
        let discovery = match &desc.discovery {
            Discovery::Listing(plan) if plan.paginate => "listing (paginated)",
            Discovery::Listing(_) => "listing",
            Discovery::Api(_) => "api",
        };

        Self {
            cli_name: desc.cli_name().to_string(),
            display_name: desc.display_name().to_string(),
            home_url: desc.home_url.to_string(),
            fetcher: desc.fetch_plan.fetcher.to_string(),
            discovery: discovery.to_string(),
            aliases: desc.aliases.iter().map(|a| (*a).to_string()).collect(),
            enabled,
            stored,
        }
    }
}

/// Result of probing one URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub url: String,
    pub fetcher: String,
    pub acquired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    pub stats: SessionStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
