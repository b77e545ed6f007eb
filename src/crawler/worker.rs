//! Per-page worker
//!
//! A worker owns one browsing session and processes one listing page at a
//! time: open the listing, discover the card count, then drive the detail
//! extractor over every card index with a randomized pause between completed
//! cards. Records accumulate locally; the dispatcher merges them once at the
//! end, so nothing here touches shared state mid-run.

use crate::config::Config;
use crate::crawler::backoff::rate_limit_delay;
use crate::crawler::dispatcher::CancelFlag;
use crate::crawler::extractor::{extract_card, CardOutcome};
use crate::crawler::listing::{count_cards, open_listing};
use crate::driver::NavigationDriver;
use crate::record::JobRecord;
use crate::state::{PageStatus, PageTask};

/// A card given up on after exhausting retries
#[derive(Debug, Clone)]
pub struct SkippedCard {
    pub index: usize,
    pub retries: u32,
}

/// What one page contributed to the run
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page: u32,
    pub status: PageStatus,
    pub records: Vec<JobRecord>,
    pub cards_found: usize,
    pub skipped: Vec<SkippedCard>,
}

impl PageOutcome {
    fn empty(page: u32, status: PageStatus) -> Self {
        Self {
            page,
            status,
            records: Vec::new(),
            cards_found: 0,
            skipped: Vec::new(),
        }
    }

    /// A page the run was cancelled before reaching
    pub fn unattempted(page: u32) -> Self {
        Self::empty(page, PageStatus::Pending)
    }

    /// A page that failed before any card could be attempted
    pub fn failed(page: u32) -> Self {
        Self::empty(page, PageStatus::Failed)
    }
}

/// Processes one listing page to completion
///
/// Always returns an outcome; page-level failures are reported in the status,
/// never raised. Cancellation is observed between card attempts only, so an
/// in-flight card always finishes.
pub async fn scrape_page<D>(
    driver: &mut D,
    config: &Config,
    page: u32,
    cancel: &CancelFlag,
) -> PageOutcome
where
    D: NavigationDriver + ?Sized,
{
    let mut task = PageTask::new(page);
    task.advance(PageStatus::InProgress);

    match open_listing(driver, config, page).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Page {}: card container never appeared", page);
            task.advance(PageStatus::Failed);
            return PageOutcome::failed(page);
        }
        Err(e) => {
            tracing::warn!("Page {}: listing navigation failed: {}", page, e);
            task.advance(PageStatus::Failed);
            return PageOutcome::failed(page);
        }
    }

    let cards_found = match count_cards(driver, &config.selectors).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Page {}: card enumeration failed: {}", page, e);
            task.advance(PageStatus::Failed);
            return PageOutcome::failed(page);
        }
    };
    tracing::info!("Page {}: {} cards found", page, cards_found);

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for index in 0..cards_found {
        if cancel.is_set() {
            tracing::info!(
                "Page {}: cancellation observed after {} of {} cards",
                page,
                index,
                cards_found
            );
            break;
        }

        match extract_card(driver, config, page, index).await {
            CardOutcome::Completed(record) => {
                if record.is_valid() {
                    tracing::debug!("Page {}: extracted {}", page, record.url);
                    records.push(record);
                } else {
                    tracing::warn!("Page {}: card {} produced no URL, discarded", page, index);
                    skipped.push(SkippedCard { index, retries: 0 });
                }

                reload_listing(driver, config, page).await;

                // Polite pause between completed cards only; retries have
                // their own backoff.
                let pause = rate_limit_delay(
                    config.crawl.rate_limit_min_ms,
                    config.crawl.rate_limit_max_ms,
                );
                tokio::time::sleep(pause).await;
            }

            CardOutcome::Skipped { retries } => {
                skipped.push(SkippedCard { index, retries });
                reload_listing(driver, config, page).await;
            }
        }
    }

    task.advance(PageStatus::Done);
    PageOutcome {
        page,
        status: task.status(),
        records,
        cards_found,
        skipped,
    }
}

/// Re-navigates to the listing so the next card starts from a known-good
/// state; a failure here is left for the next attempt's retry machinery
async fn reload_listing<D>(driver: &mut D, config: &Config, page: u32)
where
    D: NavigationDriver + ?Sized,
{
    match open_listing(driver, config, page).await {
        Ok(true) => {}
        Ok(false) => tracing::debug!("Page {}: listing not ready after reload", page),
        Err(e) => tracing::debug!("Page {}: reload failed: {}", page, e),
    }
}
