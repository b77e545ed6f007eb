//! Page dispatcher
//!
//! Assigns every page number in the configured range to a worker invocation,
//! bounded to the configured pool size by a semaphore. Each invocation gets
//! its own browsing session from the driver factory; outcomes are collected
//! in completion order. Pages are independent: one page failing never blocks
//! another.

use crate::config::Config;
use crate::crawler::worker::{scrape_page, PageOutcome};
use crate::driver::NavigationDriver;
use crate::state::PageStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cooperative cancellation signal shared across workers
///
/// Setting the flag stops new page assignments; in-flight workers finish
/// their current card attempt before observing it and returning partial
/// results.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs workers over the configured page range
pub struct Dispatcher<F> {
    config: Arc<Config>,
    factory: Arc<F>,
    cancel: CancelFlag,
}

impl<F, D> Dispatcher<F>
where
    F: Fn() -> crate::Result<D> + Send + Sync + 'static,
    D: NavigationDriver + 'static,
{
    /// Creates a dispatcher over a driver factory
    ///
    /// The factory is invoked once per page assignment so every worker owns
    /// an isolated session.
    pub fn new(config: Arc<Config>, factory: F, cancel: CancelFlag) -> Self {
        Self {
            config,
            factory: Arc::new(factory),
            cancel,
        }
    }

    /// Processes all pages, returning outcomes in completion order
    pub async fn run(&self) -> Vec<PageOutcome> {
        let worker_count = self.config.crawl.worker_count as usize;
        let semaphore = Arc::new(Semaphore::new(worker_count));
        let mut join_set = JoinSet::new();

        for page in 0..self.config.crawl.page_count {
            let semaphore = semaphore.clone();
            let config = self.config.clone();
            let factory = self.factory.clone();
            let cancel = self.cancel.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return PageOutcome::unattempted(page),
                };

                // The assignment is only issued once a pool slot opens up
                if cancel.is_set() {
                    tracing::info!("Page {} not assigned: run cancelled", page);
                    return PageOutcome::unattempted(page);
                }

                let mut driver = match factory() {
                    Ok(driver) => driver,
                    Err(e) => {
                        tracing::error!("Page {}: failed to open session: {}", page, e);
                        return PageOutcome::failed(page);
                    }
                };

                scrape_page(&mut driver, &config, page, &cancel).await
            });
        }

        let mut outcomes = Vec::with_capacity(self.config.crawl.page_count as usize);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.status == PageStatus::Failed {
                        tracing::warn!("Page {} failed", outcome.page);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    // A panicked worker loses only its own page
                    tracing::error!("Worker task failed to join: {}", e);
                }
            }
        }

        outcomes
    }
}
