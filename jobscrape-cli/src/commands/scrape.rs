//! Scrape command - harvest only.

use anyhow::Result;

use super::{SiteArgs, harvest_site, report};
use crate::app::App;
use crate::output::SiteRunOutput;
use crate::{Cli, ExitCode};

/// Harvests the selected sites.
pub async fn run(args: &SiteArgs, cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    let store = app.open_store()?;

    let mut runs = Vec::new();
    for desc in app.select_sites(&args.site)? {
        let mut out = SiteRunOutput::new(desc.id);
        harvest_site(&app, &store, desc, &mut out).await;
        runs.push(out);
    }

    report(cli, &runs)
}
