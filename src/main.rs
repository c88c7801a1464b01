//! Listing-Harvester main entry point
//!
//! This is the command-line interface for the Listing-Harvester directory
//! crawler.

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, ValueEnum};
use listing_harvester::config::{load_config_with_hash, Backend, Config};
use listing_harvester::crawler::{run_crawl, CrawlReport, CrawlRequest};
use listing_harvester::output::{
    generate_markdown_summary, print_statistics, CrawlSummary, JsonFileSink, RecordStatistics,
    ResultSink,
};
use listing_harvester::progress::Progress;
use listing_harvester::session::open_session;
use listing_harvester::url::build_page_url;
use listing_harvester::HarvestError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Listing-Harvester: a paced business-directory crawler
///
/// Walks the paginated results of a directory search, extracts one record
/// per listing, infers probable contact emails and writes the results as
/// JSON.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version)]
#[command(about = "A paced business-directory crawler", long_about = None)]
struct Cli {
    /// First results page of the directory search
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of results pages to visit
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only request listings that publish an email address
    #[arg(long)]
    only_with_email: bool,

    /// Start the browser with a throwaway profile
    #[arg(long)]
    no_profile: bool,

    /// Session backend, overriding the configuration
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Write one JSON document per results page
    #[arg(long)]
    per_page: bool,

    /// Also write a markdown summary of the run
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Validate input and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Chrome,
    Http,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Chrome => Backend::Chrome,
            BackendArg::Http => Backend::Http,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_configuration(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Validate the target before anything is launched
    let request = match CrawlRequest::new(
        &cli.url,
        cli.pages,
        cli.only_with_email,
        config.site.profile,
    ) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Invalid crawl target: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &request);
        return Ok(());
    }

    handle_crawl(config, request, config_hash, &cli).await?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Progress lines are printed by the progress consumer, so their log
/// target is silenced here.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,listing_harvester::progress=off,warn"),
            1 => EnvFilter::new("listing_harvester=debug,listing_harvester::progress=off,info"),
            2 => EnvFilter::new("listing_harvester=trace,listing_harvester::progress=off,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, if any, and applies CLI overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("reading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    if cli.no_profile {
        config.browser.use_profile = false;
    }
    if let Some(backend) = cli.backend {
        config.browser.backend = backend.into();
    }
    if cli.per_page {
        config.output.per_page = true;
    }

    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, request: &CrawlRequest) {
    println!("=== Listing-Harvester Dry Run ===\n");

    println!("Target:");
    println!("  Site: {}", request.profile);
    println!("  Category: {}", request.facets.category);
    println!("  Locality: {}", request.facets.locality);
    println!("  Max pages: {}", request.max_pages);

    println!("\nPages:");
    for page in 1..=request.max_pages.min(5) {
        println!(
            "  {}. {}",
            page,
            build_page_url(&request.base_url, request.profile, page)
        );
    }
    if request.max_pages > 5 {
        println!("  ... and {} more", request.max_pages - 5);
    }

    println!("\nPacing:");
    println!(
        "  Detail delay: {:.1}-{:.1}s",
        config.crawler.detail_delay_secs.min(),
        config.crawler.detail_delay_secs.max()
    );
    println!(
        "  Page delay: {:.1}-{:.1}s",
        config.crawler.page_delay_secs.min(),
        config.crawler.page_delay_secs.max()
    );
    println!(
        "  Cooldown: {:.0}-{:.0}s every {} details",
        config.crawler.cooldown_secs.min(),
        config.crawler.cooldown_secs.max(),
        config.crawler.cooldown_every
    );

    println!("\nSession:");
    println!("  Backend: {:?}", config.browser.backend);
    println!(
        "  Profile: {}",
        if config.browser.use_profile {
            config.browser.profile_dir.as_str()
        } else {
            "(none)"
        }
    );
    println!(
        "  Block detection: {}",
        if config.blocking.enabled { "on" } else { "off" }
    );

    let name = request.output_name();
    println!("\nOutput:");
    if config.output.per_page {
        println!("  {}/{}_page_<n>.json", config.output.directory, name);
    } else {
        println!("  {}/{}.json", config.output.directory, name);
    }

    println!("\n✓ Input is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    request: CrawlRequest,
    config_hash: Option<String>,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Utc::now();

    let session = match open_session(&config.browser).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to open browser session: {}", e);
            return Err(HarvestError::from(e).into());
        }
    };
    let backend = session.name();

    let stop = Arc::new(AtomicBool::new(false));
    let (progress, mut lines) = Progress::channel();

    // Progress consumer
    let quiet = cli.quiet;
    let consumer = tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            if !quiet {
                println!("[{}] {}", Local::now().format("%H:%M:%S"), line);
            }
        }
    });

    // Stop at the next transition on Ctrl-C
    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            signal_stop.store(true, Ordering::SeqCst);
        }
    });

    let worker_config = config.clone();
    let worker_request = request.clone();
    let worker = tokio::spawn(async move {
        run_crawl(&worker_config, &worker_request, session, progress, stop).await
    });

    let report = worker
        .await
        .map_err(|e| HarvestError::Worker(e.to_string()))?;
    let _ = consumer.await;

    let sink = JsonFileSink::new(&config.output);
    let outputs = match sink.write_report(&request.output_name(), &report) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!("Failed to write results: {}", e);
            return Err(HarvestError::from(e).into());
        }
    };

    let stats = RecordStatistics::from_records(&report.records);
    if !cli.quiet {
        print_statistics(&stats);
    }

    if let Some(path) = &cli.summary {
        let summary = build_summary(
            &request,
            &report,
            backend,
            started,
            config_hash,
            outputs.clone(),
        );
        write_summary(&summary, &stats, path)?;
    }

    tracing::info!(
        "Crawl {}: {} records written to {}",
        report.outcome,
        report.records.len(),
        sink.directory().display()
    );
    Ok(())
}

fn build_summary(
    request: &CrawlRequest,
    report: &CrawlReport,
    backend: &str,
    started: chrono::DateTime<Utc>,
    config_hash: Option<String>,
    outputs: Vec<PathBuf>,
) -> CrawlSummary {
    let finished = Utc::now();
    CrawlSummary {
        base_url: request.base_url.to_string(),
        profile: request.profile.to_string(),
        backend: backend.to_string(),
        started_at: started.to_rfc3339(),
        finished_at: finished.to_rfc3339(),
        duration_seconds: (finished - started).num_seconds().max(0) as u64,
        config_hash,
        outcome: report.outcome,
        max_pages: request.max_pages,
        pages_visited: report.pages_visited,
        details_processed: report.details_processed,
        outputs,
    }
}

fn write_summary(
    summary: &CrawlSummary,
    stats: &RecordStatistics,
    path: &Path,
) -> anyhow::Result<()> {
    generate_markdown_summary(summary, stats, path)
        .with_context(|| format!("writing summary to {}", path.display()))?;
    tracing::info!("Summary exported to: {}", path.display());
    Ok(())
}
