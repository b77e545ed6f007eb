//! Jobharvest main entry point
//!
//! Command-line interface for the job-posting extraction engine.

use clap::Parser;
use jobharvest::config::load_config_with_hash;
use jobharvest::crawler::{run_crawl, CancelFlag};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Jobharvest: a concurrent job-posting extraction engine
///
/// Crawls a paginated job-listing site, opening every card's detail view and
/// appending the extracted records to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "jobharvest")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent job-posting extraction engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    // Ctrl-C stops new page assignments; in-flight cards finish and partial
    // results are still written.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight cards");
                cancel.cancel();
            }
        });
    }

    let summary = run_crawl(config, cancel).await?;

    println!(
        "{} records written ({} duplicates dropped), {} cards skipped, {} pages failed",
        summary.records_written,
        summary.duplicates_dropped,
        summary.cards_skipped,
        summary.pages_failed
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobharvest=info,warn"),
            1 => EnvFilter::new("jobharvest=debug,info"),
            2 => EnvFilter::new("jobharvest=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &jobharvest::Config, config_hash: &str) {
    println!("=== Jobharvest Dry Run ===\n");

    println!("Crawl configuration:");
    println!("  Pages: {}", config.crawl.page_count);
    println!("  Workers: {}", config.crawl.worker_count);
    println!("  Max retries per card: {}", config.crawl.max_retries);
    println!(
        "  Per-request timeout: {}ms",
        config.crawl.per_request_timeout_ms
    );
    println!(
        "  Backoff: {}ms base, {}ms cap",
        config.crawl.backoff_base_ms, config.crawl.backoff_max_ms
    );
    println!(
        "  Rate limit pause: {}-{}ms",
        config.crawl.rate_limit_min_ms, config.crawl.rate_limit_max_ms
    );

    println!("\nTarget:");
    println!("  Listing URL prefix: {}", config.target.listing_url);
    println!(
        "  First page: {}",
        jobharvest::crawler::listing_url(&config.target.listing_url, 0)
    );

    println!("\nOutput:");
    println!("  CSV sink: {}", config.output.csv_path);

    println!("\nConfig hash: {}", config_hash);
    println!("\nConfiguration is valid.");
}
