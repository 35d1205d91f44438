//! Configuration management.

use crate::error::StoreError;
use crate::persistence::{default_config_path, default_database_path, default_log_dir};
use jobscrape_core::SiteKind;
use jobscrape_fetch::FetchSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default OpenAI chat completions endpoint.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default Google Sheets API base URL.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Default Google OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path. Defaults to the data directory.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Page acquisition settings.
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Google Sheets settings.
    #[serde(default)]
    pub sheets: SheetsConfig,
    /// Local export settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Per-site configuration keyed by CLI name.
    #[serde(default)]
    pub sites: HashMap<String, SiteConfig>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for the rotating log file.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Size at which the log file is rotated.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Number of rotated files kept.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Mirror log events to stderr.
    #[serde(default = "default_true")]
    pub stderr: bool,
}

/// Suitability classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Whether the classify phase runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// API key. Usually supplied through `OPENAI_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Chat model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Chat completions endpoint.
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

/// Google Sheets exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Whether publishing to Sheets is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Target spreadsheet id.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// Service-account credentials JSON file.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    /// Pre-issued OAuth access token, used instead of the service account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// API base URL.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

/// Local export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for CSV exports. When set, every publish also writes CSV.
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,
}

/// Site-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Whether this site is harvested.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Overrides the site's minimum content length for block detection.
    #[serde(default)]
    pub min_content_len: Option<usize>,
    /// Replaces the site's listing URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_urls: Option<Vec<String>>,
    /// Replaces the CSS selector for detail links on listing pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_max_files() -> usize {
    5
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.to_string()
}

fn default_classifier_timeout() -> u64 {
    60
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: default_log_level(),
            max_bytes: default_max_bytes(),
            max_files: default_max_files(),
            stderr: true,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: default_model(),
            endpoint: default_openai_endpoint(),
            timeout_secs: default_classifier_timeout(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spreadsheet_id: None,
            credentials_path: None,
            access_token: None,
            base_url: default_sheets_base_url(),
            token_url: default_token_url(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_content_len: None,
            listing_urls: None,
            link_selector: None,
        }
    }
}

impl SheetsConfig {
    /// Returns true if enough is configured to reach a spreadsheet.
    pub fn is_configured(&self) -> bool {
        self.enabled
            && self.spreadsheet_id.is_some()
            && (self.access_token.is_some() || self.credentials_path.is_some())
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("JOBSCRAPE_DATABASE") {
            self.database = Some(PathBuf::from(v));
        }
        if let Some(v) = get("PATH_LOGS") {
            self.log.dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("CHROME_BIN") {
            self.fetch.browser.executable = Some(PathBuf::from(v));
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.classifier.api_key = Some(v);
        }
        if let Some(v) = get("GOOGLE_SHEETS_SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = Some(v);
        }
        if let Some(v) = get("GOOGLE_SHEETS_CREDENTIALS_PATH") {
            self.sheets.credentials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("GOOGLE_SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = Some(v);
        }
    }

    /// Resolved database path.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }

    /// Resolved log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.log.dir.clone().unwrap_or_else(default_log_dir)
    }

    /// Returns the configuration for a site, or defaults.
    pub fn site(&self, kind: SiteKind) -> SiteConfig {
        self.sites.get(kind.cli_name()).cloned().unwrap_or_default()
    }

    /// Returns whether a site is enabled.
    pub fn is_site_enabled(&self, kind: SiteKind) -> bool {
        self.site(kind).enabled
    }

    /// Enabled sites in declaration order.
    pub fn enabled_sites(&self) -> Vec<SiteKind> {
        SiteKind::all()
            .iter()
            .copied()
            .filter(|kind| self.is_site_enabled(*kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.classifier.model, "gpt-3.5-turbo");
        assert_eq!(config.log.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.log.max_files, 5);
        assert_eq!(config.fetch.max_attempts, 5);
        assert!(!config.sheets.is_configured());
        assert_eq!(config.enabled_sites().len(), SiteKind::all().len());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "sites": { "costagroup": { "enabled": false } },
            "fetch": { "pagination": { "max_pages": 3 } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(!config.is_site_enabled(SiteKind::Costagroup));
        assert!(config.is_site_enabled(SiteKind::Agrilabour));
        assert_eq!(config.fetch.pagination.max_pages, 3);
        assert_eq!(config.fetch.pagination.next_selector, ".next");
        assert!(!config.enabled_sites().contains(&SiteKind::Costagroup));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_from(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "GOOGLE_SHEETS_SPREADSHEET_ID" => Some("sheet-1".to_string()),
            "GOOGLE_SHEETS_ACCESS_TOKEN" => Some("ya29.token".to_string()),
            "PATH_LOGS" => Some("/var/log/jobscrape".to_string()),
            "CHROME_BIN" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.classifier.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/jobscrape"));
        assert!(config.fetch.browser.executable.is_none());
        assert!(config.sheets.is_configured());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.database = Some(dir.path().join("jobs.sqlite3"));
        config.sites.insert(
            "workforceaustralia".to_string(),
            SiteConfig {
                min_content_len: Some(0),
                ..SiteConfig::default()
            },
        );
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.database, config.database);
        assert_eq!(
            loaded.site(SiteKind::WorkforceAustralia).min_content_len,
            Some(0)
        );
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
