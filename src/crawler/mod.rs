//! The crawl core
//!
//! Dispatcher, workers, listing navigation, the per-card extraction state
//! machine, backoff, and final aggregation. [`run_crawl`] wires the pieces
//! together over the HTTP driver and CSV sink; [`run_crawl_with`] accepts any
//! driver factory and sink, which is how the test suite runs the engine over
//! a scripted site.

mod aggregator;
mod backoff;
mod dispatcher;
mod extractor;
mod listing;
mod worker;

pub use aggregator::{merge_records, Aggregator};
pub use backoff::{backoff_delay, capped_delay_ms, rate_limit_delay};
pub use dispatcher::{CancelFlag, Dispatcher};
pub use extractor::{extract_card, CardOutcome};
pub use listing::{count_cards, listing_url, open_listing, CardProbe};
pub use worker::{scrape_page, PageOutcome, SkippedCard};

use crate::config::Config;
use crate::driver::{HttpDriver, NavigationDriver};
use crate::output::{CrawlSummary, CsvSink, RecordSink};
use std::sync::Arc;

/// Runs a full crawl with the HTTP driver and the configured CSV sink
pub async fn run_crawl(config: Config, cancel: CancelFlag) -> crate::Result<CrawlSummary> {
    let sink = CsvSink::new(&config.output.csv_path);
    let user_agent = config.target.user_agent.clone();
    let factory = move || {
        HttpDriver::new(user_agent.as_deref()).map_err(crate::HarvestError::from)
    };
    run_crawl_with(config, factory, sink, cancel).await
}

/// Runs a full crawl over an arbitrary driver factory and record sink
pub async fn run_crawl_with<F, D, S>(
    config: Config,
    factory: F,
    sink: S,
    cancel: CancelFlag,
) -> crate::Result<CrawlSummary>
where
    F: Fn() -> crate::Result<D> + Send + Sync + 'static,
    D: NavigationDriver + 'static,
    S: RecordSink,
{
    let started_at = chrono::Utc::now();
    tracing::info!(
        "Starting crawl: {} pages, {} workers",
        config.crawl.page_count,
        config.crawl.worker_count
    );

    let dispatcher = Dispatcher::new(Arc::new(config.clone()), factory, cancel);
    let outcomes = dispatcher.run().await;

    let summary = Aggregator::new(sink).finish(&config, &outcomes, started_at)?;
    summary.log();
    Ok(summary)
}
