//! Run command - the full pipeline.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use super::{
    SiteArgs, classify_site, export_aggregated, export_site, harvest_site, report,
};
use crate::app::App;
use crate::output::SiteRunOutput;
use crate::{Cli, ExitCode};

/// Arguments for the run command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub sites: SiteArgs,

    /// Skip classification.
    #[arg(long)]
    pub no_classify: bool,

    /// Skip publishing.
    #[arg(long)]
    pub no_export: bool,
}

/// Harvests, classifies and publishes each selected site in turn, then
/// publishes the aggregated worksheet.
pub async fn run(args: &RunArgs, cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    let store = app.open_store()?;
    let sites = app.select_sites(&args.sites.site)?;

    let classifier = if args.no_classify {
        None
    } else {
        match app.classifier() {
            Ok(classifier) => Some(classifier),
            Err(e) => {
                warn!(reason = %e, "Skipping classification");
                None
            }
        }
    };

    let targets = if args.no_export {
        None
    } else {
        let targets = app.export_targets(None)?;
        if targets.is_empty() {
            warn!("No export destination configured, skipping export");
            None
        } else {
            Some(targets)
        }
    };

    info!(sites = sites.len(), "Starting run");
    let mut runs = Vec::with_capacity(sites.len() + 1);

    for desc in sites {
        let mut out = SiteRunOutput::new(desc.id);
        harvest_site(&app, &store, desc, &mut out).await;

        if let Some(classifier) = &classifier {
            classify_site(&store, classifier, desc.id, &mut out).await;
        }
        if let Some(targets) = &targets {
            export_site(&store, targets, desc.id, &mut out).await;
        }
        runs.push(out);
    }

    if let Some(targets) = &targets {
        runs.push(export_aggregated(&store, targets).await);
    }

    info!("Run finished");
    report(cli, &runs)
}
