//! Check command - probe one URL through the anti-blocking loop.

use anyhow::Result;
use clap::Args;
use jobscrape_fetch::{
    AcquisitionSession, BlockDetector, BrowserFetcher, FetcherKind, HttpFetcher, PageFetcher,
};
use tracing::info;

use crate::app::App;
use crate::output::{CheckOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// URL to fetch.
    pub url: String,

    /// Use the headless browser instead of plain HTTP.
    #[arg(long)]
    pub browser: bool,

    /// Minimum content length before a page counts as blocked.
    #[arg(long)]
    pub min_len: Option<usize>,

    /// Follow the "next page" control and report every page.
    #[arg(long, requires = "browser")]
    pub paginate: bool,
}

/// Fetches a URL and reports whether it could be acquired.
pub async fn run(args: &CheckArgs, cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli)?;
    let settings = &app.config.fetch;

    let kind = if args.browser {
        FetcherKind::Browser
    } else {
        FetcherKind::Http
    };
    let fetcher: Box<dyn PageFetcher> = match kind {
        FetcherKind::Http => Box::new(HttpFetcher::from_settings(&settings.http)),
        FetcherKind::Browser => Box::new(BrowserFetcher::new(settings.browser.clone())),
    };

    let mut detector = BlockDetector::from_settings(&settings.detector);
    if let Some(min) = args.min_len {
        detector = detector.with_min_content_len(min);
    }
    let mut session = AcquisitionSession::from_settings(fetcher, settings).with_detector(detector);

    info!(url = %args.url, fetcher = %kind, "Checking URL");
    let result = if args.paginate {
        session
            .fetch_all_pages(&args.url)
            .await
            .map(|pages| pages.iter().map(|p| p.chars().count()).sum::<usize>())
    } else {
        session.fetch(&args.url).await.map(|content| content.chars().count())
    };
    let stats = session.stats();
    session.close().await;

    let output = CheckOutput {
        url: args.url.clone(),
        fetcher: kind.to_string(),
        acquired: result.is_ok(),
        content_length: result.as_ref().ok().copied(),
        stats,
        error: result.as_ref().err().map(ToString::to_string),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_check(&output));
            if args.paginate && output.acquired {
                println!("  pages     {}", stats.pages);
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(if output.acquired {
        ExitCode::Success
    } else {
        ExitCode::Partial
    })
}
