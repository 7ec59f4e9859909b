//! Polk-Scraper main entry point
//!
//! This is the command-line interface for the Polk-Scraper veteran card harvester.

use anyhow::Context;
use clap::Parser;
use polk_scraper::config::{load_config_with_hash, validate, Config};
use polk_scraper::crawler::Coordinator;
use polk_scraper::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Polk-Scraper: a polite veteran card harvester
///
/// Walks the paginated veteran listing, saves each card's portrait and appends
/// the card's biographical fields to a CSV table, until the image quota is met.
#[derive(Parser, Debug)]
#[command(name = "polk-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A polite veteran card harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of images to save
    #[arg(long, value_name = "N")]
    max_items: Option<u32>,

    /// Stop after this listing page even if the quota is unmet
    #[arg(long, value_name = "PAGE")]
    max_pages: Option<u32>,

    /// Override the images directory
    #[arg(long, value_name = "DIR")]
    images_dir: Option<String>,

    /// Override the metadata table path
    #[arg(long, value_name = "FILE")]
    metadata_path: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber
///
/// Explicit flags win; otherwise `LOG_LEVEL` (default `INFO`) picks the level.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => {
                let level = std::env::var("LOG_LEVEL")
                    .map(|l| l.trim().to_lowercase())
                    .unwrap_or_else(|_| "info".to_string());
                let level = match level.as_str() {
                    "trace" | "debug" | "info" | "error" => level,
                    "warn" | "warning" => "warn".to_string(),
                    "critical" => "error".to_string(),
                    _ => "info".to_string(),
                };
                EnvFilter::new(format!("polk_scraper={level},warn"))
            }
            1 => EnvFilter::new("polk_scraper=debug,info"),
            2 => EnvFilter::new("polk_scraper=trace,debug"),
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

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_items) = cli.max_items {
        config.crawler.max_items = max_items;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(images_dir) = &cli.images_dir {
        config.output.images_dir = images_dir.clone();
    }
    if let Some(metadata_path) = &cli.metadata_path {
        config.output.metadata_path = metadata_path.clone();
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Polk-Scraper Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing template: {}", config.site.listing_path_template);
    println!("  Placeholder image: {}", config.site.placeholder_image_url);

    println!("\nHTTP:");
    println!("  Timeout: {}ms", config.http.request_timeout_ms);
    println!(
        "  Retries: {} (backoff {}ms, max {}ms)",
        config.http.max_retries, config.http.backoff_base_ms, config.http.backoff_max_ms
    );
    println!("  User agent: {}", config.http.user_agent);

    println!("\nCrawler:");
    println!("  Max items: {}", config.crawler.max_items);
    println!("  Delay between requests: {}ms", config.crawler.delay_ms);
    match config.crawler.max_pages {
        Some(pages) => println!("  Page ceiling: {}", pages),
        None => println!("  Page ceiling: none"),
    }
    if let Some(streak) = config.crawler.max_consecutive_empty_pages {
        println!("  Stop after empty pages: {}", streak);
    }
    println!("  Skip existing images: {}", config.crawler.skip_existing_images);

    println!("\nOutput:");
    println!("  Images: {}", config.output.images_dir);
    println!("  Metadata: {}", config.output.metadata_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// Ctrl-C ends the run cleanly: rows and images written so far are kept.
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let mut coordinator =
        Coordinator::new(config).context("Failed to initialize the crawler")?;

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available: never fire
            std::future::pending::<()>().await;
        }
    };

    let outcome = tokio::select! {
        result = coordinator.run() => Some(result),
        _ = interrupted => None,
    };

    match outcome {
        Some(result) => {
            let report = result.context("Crawl aborted")?;
            tracing::info!("Crawl completed successfully");
            print_report(&report);
        }
        None => {
            tracing::warn!(
                "Interrupted by user after {} saved images",
                coordinator.report().images_saved
            );
            eprintln!("Interrupted by user");
        }
    }

    Ok(())
}
