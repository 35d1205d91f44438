//! Classify command - label stored listings.

use anyhow::Result;

use super::{SiteArgs, classify_site, report};
use crate::app::App;
use crate::output::SiteRunOutput;
use crate::{Cli, ExitCode};

/// Labels the pending records of the selected sites.
pub async fn run(args: &SiteArgs, cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    let classifier = app.classifier()?;
    let store = app.open_store()?;

    let mut runs = Vec::new();
    for desc in app.select_sites(&args.site)? {
        let mut out = SiteRunOutput::new(desc.id);
        classify_site(&store, &classifier, desc.id, &mut out).await;
        runs.push(out);
    }

    report(cli, &runs)
}
