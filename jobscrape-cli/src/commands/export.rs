//! Export command - publish stored listings.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use super::{SiteArgs, export_aggregated, export_site, report};
use crate::app::App;
use crate::output::SiteRunOutput;
use crate::{Cli, ExitCode};

/// Arguments for the export command.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub sites: SiteArgs,

    /// Also write `<worksheet>.csv` files into this directory.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Skip the aggregated `all` worksheet.
    #[arg(long)]
    pub no_aggregate: bool,
}

/// Publishes site worksheets and the aggregated worksheet.
pub async fn run(args: &ExportArgs, cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    let targets = app.export_targets(args.csv.as_deref())?;
    if targets.is_empty() {
        bail!("no export destination configured (Sheets credentials or --csv)");
    }
    let store = app.open_store()?;

    let mut runs = Vec::new();
    for desc in app.select_sites(&args.sites.site)? {
        let mut out = SiteRunOutput::new(desc.id);
        export_site(&store, &targets, desc.id, &mut out).await;
        runs.push(out);
    }
    if !args.no_aggregate {
        runs.push(export_aggregated(&store, &targets).await);
    }

    report(cli, &runs)
}
