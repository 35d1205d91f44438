//! Config command - manage configuration.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use jobscrape_core::SiteKind;
use jobscrape_store::{Config, SiteConfig, default_config_dir, save_json};
use tracing::info;

use crate::app::App;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets masked).
    Show,

    /// Show configuration and data paths.
    Path,

    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli)?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(cli, *force).await?,
    }
    Ok(ExitCode::Success)
}

/// Replaces secrets with a fixed marker.
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    let mask = |value: &mut Option<String>| {
        if value.is_some() {
            *value = Some("********".to_string());
        }
    };
    mask(&mut config.classifier.api_key);
    mask(&mut config.sheets.access_token);
    config
}

fn show_config(cli: &Cli) -> Result<()> {
    let app = App::load(cli)?;
    let config = masked(&app.config);

    match cli.format {
        OutputFormat::Text => {
            println!("jobscrape Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file:   {}", app.config_path.display());
            println!("Database:      {}", config.database_path().display());
            println!("Log directory: {}", config.log_dir().display());
            println!();
            println!("Enabled sites:");
            for site in config.enabled_sites() {
                println!("  • {}", site.display_name());
            }
            println!();
            println!("Attempts per page: {}", config.fetch.max_attempts);
            println!(
                "Min content size:  {} chars",
                config.fetch.detector.min_content_len
            );
            println!(
                "Classifier:        {} ({})",
                if config.classifier.enabled && config.classifier.api_key.is_some() {
                    "on"
                } else {
                    "off"
                },
                config.classifier.model
            );
            println!(
                "Sheets export:     {}",
                if config.sheets.is_configured() { "on" } else { "off" }
            );
            if let Some(dir) = &config.export.csv_dir {
                println!("CSV export:        {}", dir.display());
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let app = App::load(cli)?;

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", default_config_dir().display());
            println!("Config file:   {}", app.config_path.display());
            println!("Database:      {}", app.config.database_path().display());
            println!("Log directory: {}", app.config.log_dir().display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": default_config_dir().display().to_string(),
                "config_file": app.config_path.display().to_string(),
                "database": app.config.database_path().display().to_string(),
                "log_dir": app.config.log_dir().display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut config = Config::default();
    for site in SiteKind::all() {
        config
            .sites
            .insert(site.cli_name().to_string(), SiteConfig::default());
    }

    save_json(&path, &config).await?;
    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote {}", path.display());

    Ok(())
}
