// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! jobscrape CLI - harvest, classify and publish job listings.
//!
//! # Examples
//!
//! ```bash
//! # Full pipeline for every enabled site
//! jobscrape run
//!
//! # Harvest a single site
//! jobscrape scrape --site agrilabour
//!
//! # Label stored listings
//! jobscrape classify
//!
//! # Publish to CSV files as well as Sheets
//! jobscrape export --csv ./exports
//!
//! # Probe a URL through the anti-blocking loop
//! jobscrape check https://example.com/jobs --browser
//! ```

mod app;
mod commands;
mod logging;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use commands::{check, classify, config, export, run, scrape, sites};

// ============================================================================
// CLI Definition
// ============================================================================

/// jobscrape - job listing harvester.
#[derive(Parser)]
#[command(name = "jobscrape")]
#[command(about = "Harvest job listings from recruiting sites")]
#[command(long_about = r#"
jobscrape harvests job listings from recruiting sites that push back on
scrapers, labels them with an OpenAI classifier, and publishes them to
Google Sheets or CSV files.

Supported sites:
  • Agri Labour Australia (agrilabour)
  • APG Workforce (apgworkforce)
  • Costa Group (costagroup)
  • Workforce Australia (workforceaustralia)

Examples:
  jobscrape run                        # Everything, every enabled site
  jobscrape scrape --site agrilabour   # One site, harvest only
  jobscrape export --csv ./exports     # Publish stored listings
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (debug logging).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no log output on stderr).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Harvest, classify and publish (the full pipeline).
    Run(run::RunArgs),

    /// Harvest new listings only.
    #[command(visible_alias = "s")]
    Scrape(commands::SiteArgs),

    /// Label stored listings that have no label yet.
    #[command(visible_alias = "c")]
    Classify(commands::SiteArgs),

    /// Publish stored listings.
    #[command(visible_alias = "e")]
    Export(export::ExportArgs),

    /// List supported sites.
    Sites,

    /// Fetch one URL through the anti-blocking loop.
    Check(check::CheckArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// Startup or unexpected error.
    Error = 1,
    /// At least one site or phase failed; the others completed.
    Partial = 2,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::run(args, &cli).await,
        Commands::Scrape(args) => scrape::run(args, &cli).await,
        Commands::Classify(args) => classify::run(args, &cli).await,
        Commands::Export(args) => export::run(args, &cli).await,
        Commands::Sites => sites::run(&cli),
        Commands::Check(args) => check::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "Command failed");
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::Error
        }
    };

    std::process::exit(code as i32);
}
