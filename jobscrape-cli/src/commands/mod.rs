//! CLI command implementations.

pub mod check;
pub mod classify;
pub mod config;
pub mod export;
pub mod run;
pub mod scrape;
pub mod sites;

use anyhow::Result;
use clap::Args;
use jobscrape_core::SiteKind;
use jobscrape_services::{ExportTargets, OpenAiClassifier};
use jobscrape_sites::{
    AGGREGATED_WORKSHEET, SiteDescriptor, classify_pending, harvest, publish_aggregated,
    publish_site, rebuild_aggregated,
};
use jobscrape_store::JobStore;
use tracing::{error, info};

use crate::app::App;
use crate::output::{JsonFormatter, SiteRunOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Site selection shared by several commands.
#[derive(Args, Debug, Default)]
pub struct SiteArgs {
    /// Sites to process (comma-separated or repeated; `all` for every
    /// site). Defaults to the enabled sites.
    #[arg(long, short)]
    pub site: Vec<String>,
}

// ============================================================================
// Phases
// ============================================================================

/// Harvests one site with its own session, closed afterwards.
pub async fn harvest_site(
    app: &App,
    store: &JobStore,
    desc: &SiteDescriptor,
    out: &mut SiteRunOutput,
) {
    let plan = app.plan(desc);
    let mut session = app.session(desc);

    match harvest(&plan, &mut session, store).await {
        Ok(report) => out.harvest = Some(report),
        Err(e) => {
            error!(site = %desc.id, error = %e, "Harvest failed");
            out.errors.push(format!("harvest: {e}"));
        }
    }

    out.acquisition = Some(session.stats());
    session.close().await;
}

/// Labels one site's pending records.
pub async fn classify_site(
    store: &JobStore,
    classifier: &OpenAiClassifier,
    site: SiteKind,
    out: &mut SiteRunOutput,
) {
    match classify_pending(store, classifier, site).await {
        Ok(report) => out.classify = Some(report),
        Err(e) => {
            error!(site = %site, error = %e, "Classification failed");
            out.errors.push(format!("classify: {e}"));
        }
    }
}

/// Publishes one site's worksheet.
pub async fn export_site(
    store: &JobStore,
    targets: &ExportTargets,
    site: SiteKind,
    out: &mut SiteRunOutput,
) {
    match publish_site(store, targets, site).await {
        Ok(rows) => out.exported_rows = Some(rows),
        Err(e) => {
            error!(site = %site, error = %e, "Export failed");
            out.errors.push(format!("export: {e}"));
        }
    }
}

/// Rebuilds the aggregated records of every site and publishes the recent
/// ones to the `all` worksheet.
pub async fn export_aggregated(store: &JobStore, targets: &ExportTargets) -> SiteRunOutput {
    let mut out = SiteRunOutput::named(AGGREGATED_WORKSHEET);

    let published = match rebuild_aggregated(store, SiteKind::all()) {
        Ok(total) => {
            info!(records = total, "Aggregated records rebuilt");
            publish_aggregated(store, targets, chrono::Utc::now()).await
        }
        Err(e) => Err(e),
    };
    match published {
        Ok(rows) => out.exported_rows = Some(rows),
        Err(e) => {
            error!(error = %e, "Aggregated export failed");
            out.errors.push(format!("export: {e}"));
        }
    }

    out
}

// ============================================================================
// Output
// ============================================================================

/// Prints per-site outcomes and maps them to an exit code.
pub fn report(cli: &Cli, runs: &[SiteRunOutput]) -> Result<ExitCode> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for run in runs {
                println!("{}", formatter.format_site_run(run));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&runs)?);
        }
    }

    if runs.iter().any(SiteRunOutput::has_errors) {
        Ok(ExitCode::Partial)
    } else {
        Ok(ExitCode::Success)
    }
}
