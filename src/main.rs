//! Dealer Locator main entry point
//!
//! This is the command-line interface for discovering the dealership
//! locations of one automotive group website.

use anyhow::Context;
use clap::Parser;
use dealer_locator::config::{load_config, Config};
use dealer_locator::crawler::{DiscoveryRequest, Fetcher, HttpFetcher, StrategyOrchestrator};
use dealer_locator::model::LocationKind;
use dealer_locator::url::parse_root_url;
use dealer_locator::CrawlResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Dealer Locator: finds every dealership of a dealer group
///
/// Tries sitemaps, directory pages, JSON endpoints and a bounded crawl of
/// the group's site, in that order, and prints the deduplicated locations.
#[derive(Parser, Debug)]
#[command(name = "dealer-locator")]
#[command(version)]
#[command(about = "Finds the dealership locations of an automotive group website", long_about = None)]
struct Cli {
    /// Root URL of the dealer group's website
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Do not fetch the homepage to look for directory links
    #[arg(long)]
    skip_homepage: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let root = parse_root_url(&cli.root_url).context("Invalid root URL")?;

    let fetcher = HttpFetcher::new(&config.fetcher).context("Failed to build HTTP client")?;
    let homepage = if cli.skip_homepage {
        None
    } else {
        fetch_homepage(&fetcher, &root, &config).await
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let orchestrator = StrategyOrchestrator::new(config, Arc::new(fetcher));
    let mut request = DiscoveryRequest::new().with_cancellation(cancel);
    if let Some(html) = homepage.as_deref() {
        request = request.with_homepage(html);
    }

    let result = orchestrator.discover(root.as_str(), request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dealer_locator=info,warn"),
            1 => EnvFilter::new("dealer_locator=debug,info"),
            2 => EnvFilter::new("dealer_locator=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Fetches the homepage once so the directory and crawl strategies can
/// reuse it; failure just means discovery runs without it
async fn fetch_homepage(
    fetcher: &HttpFetcher,
    root: &url::Url,
    config: &Config,
) -> Option<String> {
    match fetcher.get_success(root, config.fetcher.page_timeout()).await {
        Ok(page) => Some(page.body),
        Err(e) => {
            tracing::warn!("Could not fetch homepage: {}", e);
            None
        }
    }
}

/// Cancels the run on Ctrl-C so the partial result still gets printed
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the locations found so far");
            cancel.cancel();
        }
    });
}

fn print_result(result: &CrawlResult) {
    println!(
        "Found {} locations (method: {})",
        result.total_found(),
        result.method()
    );

    for location in result.locations() {
        let kind = match location.classification {
            LocationKind::InternalPage => "page",
            LocationKind::ExternalSite => "site",
            LocationKind::Unknown => "?",
        };
        match &location.dealer_id {
            Some(id) => println!(
                "  [{}] {} - {} (dealer {})",
                kind, location.display_name, location.canonical_url, id
            ),
            None => println!(
                "  [{}] {} - {}",
                kind, location.display_name, location.canonical_url
            ),
        }
    }
}
