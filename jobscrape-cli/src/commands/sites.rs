//! Sites command - list supported sites.

use anyhow::Result;
use jobscrape_sites::SiteRegistry;
use tracing::{debug, info};

use crate::app::App;
use crate::output::{JsonFormatter, SiteInfoOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Lists every site with its strategy and stored record count.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    info!("Listing sites");

    // Counts are best effort; a missing database just leaves them blank.
    let store = if app.config.database_path().exists() {
        app.open_store()
            .inspect_err(|e| debug!(error = %e, "Database unavailable"))
            .ok()
    } else {
        None
    };

    let sites: Vec<SiteInfoOutput> = SiteRegistry::all()
        .iter()
        .map(|desc| {
            let stored = store.as_ref().and_then(|s| s.count(desc.id).ok());
            SiteInfoOutput::new(desc, app.config.is_site_enabled(desc.id), stored)
        })
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_sites_header());
            println!("{}", "─".repeat(87));
            for site in &sites {
                println!("{}", formatter.format_site_line(site));
            }
            println!();
            println!(
                "Total: {} sites ({} enabled)",
                sites.len(),
                sites.iter().filter(|s| s.enabled).count()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&sites)?);
        }
    }

    Ok(ExitCode::Success)
}
