//! Sumi-Sift main entry point
//!
//! This is the command-line interface for the Sumi-Sift listing harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_sift::config::{load_config_with_hash, Config};
use sumi_sift::output::{print_statistics, write_table, ScrapeStatistics};
use sumi_sift::pipeline::{build_page_url, RetryPolicy, ScrapeRequest, Scraper};
use tracing_subscriber::EnvFilter;

/// Sumi-Sift: A polite listing harvester
///
/// Sumi-Sift fetches marketplace search result pages one at a time, with
/// randomized pauses and rotating browser identities, and saves the listings
/// it finds as a CSV table.
#[derive(Parser, Debug)]
#[command(name = "sumi-sift")]
#[command(version = "1.0.0")]
#[command(about = "A polite listing harvester", long_about = None)]
struct Cli {
    /// Search term
    #[arg(value_name = "SEARCH_TERM")]
    search_term: String,

    /// Number of result pages to scrape
    #[arg(short, long, default_value_t = 1)]
    pages: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the CSV table (overrides the configured directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the table to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Show the page URLs that would be requested without fetching them
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.search_term, cli.pages)?;
    } else {
        handle_scrape(config, &cli).await?;
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
            0 => EnvFilter::new("sumi_sift=info,warn"),
            1 => EnvFilter::new("sumi_sift=debug,info"),
            2 => EnvFilter::new("sumi_sift=trace,debug"),
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

/// Handles the --dry-run mode: validates input and shows what would be fetched
fn handle_dry_run(config: &Config, search_term: &str, pages: u32) -> anyhow::Result<()> {
    let request = ScrapeRequest::new(search_term, pages, config.scraper.max_pages)?;

    println!("=== Sumi-Sift Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Max attempts per page: {}", config.scraper.max_attempts);
    println!("  Base delay: {}s", config.scraper.base_delay_secs);
    println!(
        "  Jitter: {}s - {}s",
        config.scraper.jitter_min_secs, config.scraper.jitter_max_secs
    );
    println!(
        "  Page delay: {}s - {}s",
        config.scraper.page_delay_min_secs, config.scraper.page_delay_max_secs
    );
    println!("  Request timeout: {}s", config.scraper.request_timeout_secs);
    println!("  Identities: {}", config.identity.user_agents.len());
    println!(
        "  Worst case per page: {:.0}s",
        RetryPolicy::from_config(config).worst_case().as_secs_f64()
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Columns: {}", config.output.columns.join(", "));

    println!("\nPages ({}):", request.page_count());
    for page in 1..=request.page_count() {
        let url = build_page_url(&config.scraper, request.search_term(), page)?;
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, cli: &Cli) -> anyhow::Result<()> {
    let directory = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let scraper = Scraper::new(config)?;

    let mut report_progress = |page: u32, total: u32| {
        tracing::info!("Progress: page {} of {}", page, total);
    };

    let result = scraper
        .scrape(&cli.search_term, cli.pages, Some(&mut report_progress))
        .await?;

    let Some(table) = &result.table else {
        tracing::error!("No items were scraped");
        println!("No items were scraped. Please check the search term and try again.");
        return Ok(());
    };

    if cli.stdout {
        print!("{}", table);
    } else {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = save_table(table, &directory, &result.search_term, &timestamp)?;
        println!("✓ Data successfully saved to {}", path.display());
        print_statistics(&ScrapeStatistics::from_result(&result));
    }

    Ok(())
}

fn save_table(
    table: &str,
    directory: &Path,
    search_term: &str,
    timestamp: &str,
) -> anyhow::Result<PathBuf> {
    write_table(table, directory, search_term, timestamp)
        .with_context(|| format!("failed to write table into {}", directory.display()))
}
