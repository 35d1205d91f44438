//! Shared command context: configuration, logging, store and services.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use jobscrape_fetch::AcquisitionSession;
use jobscrape_services::{
    CsvExporter, ExportTargets, OpenAiClassifier, SheetsExporter, TokenSource,
};
use jobscrape_sites::{HarvestPlan, SiteDescriptor, SiteRegistry};
use jobscrape_store::{Config, JobStore};
use tracing::{debug, info, warn};

use crate::{Cli, logging};

/// Everything a command needs after startup.
pub struct App {
    /// Effective configuration (file plus environment).
    pub config: Config,
    /// Where the configuration was read from.
    pub config_path: PathBuf,
}

impl App {
    /// Loads configuration and installs logging.
    ///
    /// An unreadable configuration file is fatal; an unwritable log
    /// directory only disables the log file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
        let mut config = Config::load_from(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;
        config.apply_env();

        let log_dir = config.log_dir();
        match logging::init(&config.log, &log_dir, cli.verbose, cli.quiet) {
            Ok(path) => debug!(path = %path.display(), "Logging to file"),
            Err(e) => {
                logging::init_stderr(&config.log.level, cli.verbose, cli.quiet);
                warn!(error = format!("{e:#}"), "File logging disabled");
            }
        }

        info!(config = %config_path.display(), "Configuration loaded");
        Ok(Self::from_config(config, config_path))
    }

    /// Wraps an already loaded configuration.
    pub fn from_config(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Opens the job database.
    pub fn open_store(&self) -> Result<JobStore> {
        let path = self.config.database_path();
        JobStore::open(&path)
            .with_context(|| format!("failed to open database {}", path.display()))
    }

    /// Resolves `--site` values. Empty selects every enabled site; `all`
    /// selects every site.
    pub fn select_sites(&self, names: &[String]) -> Result<Vec<&'static SiteDescriptor>> {
        let names: Vec<&str> = names
            .iter()
            .flat_map(|n| n.split(','))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Ok(self
                .config
                .enabled_sites()
                .into_iter()
                .filter_map(SiteRegistry::get)
                .collect());
        }
        if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
            return Ok(SiteRegistry::all().iter().collect());
        }

        let mut selected: Vec<&'static SiteDescriptor> = Vec::new();
        for name in names {
            let desc = SiteRegistry::get_by_cli_name(name).ok_or_else(|| {
                anyhow!("Unknown site: {name}. Run `jobscrape sites` for the list")
            })?;
            if !self.config.is_site_enabled(desc.id) {
                info!(site = %desc.id, "Site disabled in config, running because it was named");
            }
            if !selected.iter().any(|d| d.id == desc.id) {
                selected.push(desc);
            }
        }
        Ok(selected)
    }

    /// Harvest plan for a site with config overrides applied.
    pub fn plan(&self, desc: &SiteDescriptor) -> HarvestPlan {
        let site = self.config.site(desc.id);
        let mut plan = desc.plan();
        if let Some(urls) = site.listing_urls {
            plan = plan.with_listing_urls(urls);
        }
        if let Some(selector) = site.link_selector {
            plan = plan.with_link_selector(selector);
        }
        plan
    }

    /// Acquisition session for a site with config overrides applied.
    pub fn session(&self, desc: &SiteDescriptor) -> AcquisitionSession {
        let site = self.config.site(desc.id);
        desc.build_session(&self.config.fetch, site.min_content_len)
    }

    /// Builds the classifier.
    ///
    /// # Errors
    ///
    /// Fails if classification is disabled or no API key is configured.
    pub fn classifier(&self) -> Result<OpenAiClassifier> {
        let cfg = &self.config.classifier;
        if !cfg.enabled {
            bail!("classification is disabled in the configuration");
        }
        let key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no OpenAI API key (set OPENAI_API_KEY)"))?;

        let classifier = OpenAiClassifier::with_timeout(
            key,
            cfg.model.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )?
        .with_endpoint(cfg.endpoint.clone());
        Ok(classifier)
    }

    /// Builds every configured export destination.
    ///
    /// `csv_dir` overrides the configured CSV directory.
    pub fn export_targets(&self, csv_dir: Option<&Path>) -> Result<ExportTargets> {
        let mut targets = ExportTargets::new();

        let sheets = &self.config.sheets;
        if sheets.is_configured() {
            let id = sheets.spreadsheet_id.clone().unwrap_or_default();
            let exporter = match (&sheets.access_token, &sheets.credentials_path) {
                (Some(token), _) => SheetsExporter::new(id, TokenSource::fixed(token.clone()))?,
                (None, Some(path)) => {
                    SheetsExporter::with_service_account(id, path, &sheets.token_url)?
                }
                (None, None) => bail!("Sheets export needs an access token or credentials file"),
            };
            targets = targets.with_sheets(exporter.with_base_url(&sheets.base_url)?);
        } else if sheets.enabled {
            debug!("Sheets export enabled but not configured");
        }

        let csv_dir = csv_dir
            .map(Path::to_path_buf)
            .or_else(|| self.config.export.csv_dir.clone());
        if let Some(dir) = csv_dir {
            targets = targets.with_csv(CsvExporter::new(dir));
        }

        Ok(targets)
    }
}
