//! Detail extraction state machine
//!
//! Runs one card attempt at a time: resolve the card, click it, wait for the
//! detail view, read the fields. Transient failures restart the whole attempt
//! from the clicking step after a backoff; exhausting the retry budget skips
//! the card. Nothing that happens here ever escapes the card boundary.

use crate::config::Config;
use crate::crawler::backoff::backoff_delay;
use crate::crawler::listing::open_listing;
use crate::driver::{DriverError, Lookup, NavigationDriver, Wait};
use crate::record::JobRecord;
use crate::state::{CardAttempt, CardState};

/// Terminal outcome of a card
#[derive(Debug, Clone)]
pub enum CardOutcome {
    /// The detail view was read; the record may still have empty fields
    Completed(JobRecord),

    /// The card was skipped after `retries` retry cycles
    Skipped { retries: u32 },
}

/// Why an attempt did not complete
enum AttemptFailure {
    /// Transient: eligible for a backoff-and-restart cycle
    Retryable(String),

    /// Unclassified: terminal for this card, contained at the card boundary
    Fatal(String),
}

impl From<crate::HarvestError> for AttemptFailure {
    fn from(err: crate::HarvestError) -> Self {
        AttemptFailure::Fatal(err.to_string())
    }
}

/// Extracts one card, driving the attempt to a terminal state
///
/// Never returns an error: unexpected failures are logged and folded into
/// [`CardOutcome::Skipped`], so a misbehaving card cannot abort its worker.
pub async fn extract_card<D>(
    driver: &mut D,
    config: &Config,
    page: u32,
    index: usize,
) -> CardOutcome
where
    D: NavigationDriver + ?Sized,
{
    let mut attempt = CardAttempt::new(index);
    if let Err(e) = attempt.transition(CardState::Clicking) {
        tracing::error!("Card {} on page {}: {}", index, page, e);
        return CardOutcome::Skipped { retries: 0 };
    }

    loop {
        match run_attempt(driver, config, &mut attempt).await {
            Ok(record) => return CardOutcome::Completed(record),

            Err(AttemptFailure::Fatal(message)) => {
                tracing::error!(
                    "Card {} on page {} hit an unexpected failure: {}",
                    index,
                    page,
                    message
                );
                let _ = attempt.transition(CardState::FailedRetryable);
                let _ = attempt.transition(CardState::FailedTerminal);
                return CardOutcome::Skipped {
                    retries: attempt.retries,
                };
            }

            Err(AttemptFailure::Retryable(reason)) => {
                if attempt.transition(CardState::FailedRetryable).is_err() {
                    return CardOutcome::Skipped {
                        retries: attempt.retries,
                    };
                }

                if attempt.retries >= config.crawl.max_retries {
                    let _ = attempt.transition(CardState::FailedTerminal);
                    tracing::warn!(
                        "Card {} on page {} skipped after {} retries: {}",
                        index,
                        page,
                        attempt.retries,
                        reason
                    );
                    return CardOutcome::Skipped {
                        retries: attempt.retries,
                    };
                }

                let delay = backoff_delay(
                    attempt.retries,
                    config.crawl.backoff_base_ms,
                    config.crawl.backoff_max_ms,
                );
                tracing::warn!(
                    "Card {} on page {} failed ({}); retrying in {:?} (attempt {}/{})",
                    index,
                    page,
                    reason,
                    delay,
                    attempt.retries + 1,
                    config.crawl.max_retries
                );
                tokio::time::sleep(delay).await;

                // Re-navigate to the listing so the restarted attempt begins
                // from a known-good state. If this itself fails, the next
                // attempt's lookups will miss and consume the next retry.
                match open_listing(driver, config, page).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::debug!("Listing for page {} not ready during recovery", page)
                    }
                    Err(e) => tracing::debug!("Recovery navigation failed: {}", e),
                }

                if attempt.restart().is_err() {
                    return CardOutcome::Skipped {
                        retries: attempt.retries,
                    };
                }
            }
        }
    }
}

/// One pass through the attempt state machine, entered in `Clicking`
async fn run_attempt<D>(
    driver: &mut D,
    config: &Config,
    attempt: &mut CardAttempt,
) -> Result<JobRecord, AttemptFailure>
where
    D: NavigationDriver + ?Sized,
{
    let selectors = &config.selectors;
    let index = attempt.index;

    // The container must be present before the card can be resolved
    match driver
        .find(&selectors.card_container)
        .await
        .map_err(fatal)?
    {
        Lookup::Found(_) => {}
        Lookup::NotFound | Lookup::Stale => {
            return Err(AttemptFailure::Retryable(
                "card container missing from listing".to_string(),
            ));
        }
    }

    let card_selector = selectors.card_selector(index);
    let card = match driver.find(&card_selector).await.map_err(fatal)? {
        Lookup::Found(handle) => handle,
        Lookup::NotFound => {
            return Err(AttemptFailure::Retryable(format!(
                "card {} not found",
                card_selector
            )));
        }
        Lookup::Stale => {
            return Err(AttemptFailure::Retryable(format!(
                "stale reference for {}",
                card_selector
            )));
        }
    };

    match driver.click(&card).await {
        Ok(()) => {}
        Err(DriverError::ClickIntercepted { .. }) => {
            // One programmatic fallback before the step counts as failed
            tracing::debug!("Click on card {} intercepted; dispatching programmatically", index);
            driver
                .dispatch_click(&card)
                .await
                .map_err(|e| AttemptFailure::Retryable(e.to_string()))?;
        }
        Err(DriverError::StaleElement { .. }) => {
            return Err(AttemptFailure::Retryable(format!(
                "card {} went stale before the click",
                index
            )));
        }
        Err(e) => return Err(fatal(e)),
    }

    attempt.transition(CardState::WaitingForDetail)?;

    let timeout = config.crawl.request_timeout();
    for marker in [&selectors.detail_title, &selectors.detail_description] {
        match driver.wait_for(marker, timeout).await.map_err(fatal)? {
            Wait::Element(_) => {}
            Wait::TimedOut => {
                return Err(AttemptFailure::Retryable(format!(
                    "detail marker {} timed out",
                    marker
                )));
            }
        }
    }

    attempt.transition(CardState::Extracting)?;

    // The detail view is the record's identity
    let url = driver.current_url().unwrap_or_default();

    // Each field is independent: a miss yields an empty string, never a
    // failed attempt.
    let record = JobRecord {
        url,
        title: field_text(driver, &selectors.detail_title).await,
        location: field_text(driver, &selectors.detail_location).await,
        employment_type: field_text(driver, &selectors.detail_employment_type).await,
        seniority: field_text(driver, &selectors.detail_seniority).await,
        min_experience: field_text(driver, &selectors.detail_min_experience).await,
        industry: field_text(driver, &selectors.detail_industry).await,
        salary_range: field_text(driver, &selectors.detail_salary_range).await,
        description: field_text(driver, &selectors.detail_description).await,
        skills_needed: field_text(driver, &selectors.detail_skills).await,
    };

    attempt.transition(CardState::Completed)?;
    Ok(record)
}

fn fatal(err: DriverError) -> AttemptFailure {
    AttemptFailure::Fatal(err.to_string())
}

/// Reads one detail field, mapping every miss to an empty string
async fn field_text<D>(driver: &mut D, selector: &str) -> String
where
    D: NavigationDriver + ?Sized,
{
    match driver.find(selector).await {
        Ok(Lookup::Found(element)) => driver.text(&element).await.unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlConfig, OutputConfig, SelectorConfig, TargetConfig};
    use crate::driver::{CardBehavior, StubCard, StubDriver, StubPage, StubSite};
    use std::sync::Arc;

    const PREFIX: &str = "stub://site/search?page=";

    fn test_config(max_retries: u32) -> Config {
        Config {
            crawl: CrawlConfig {
                page_count: 1,
                worker_count: 1,
                max_retries,
                per_request_timeout_ms: 1_000,
                backoff_base_ms: 1,
                backoff_max_ms: 2,
                rate_limit_min_ms: 0,
                rate_limit_max_ms: 0,
            },
            target: TargetConfig {
                listing_url: PREFIX.to_string(),
                user_agent: None,
            },
            selectors: SelectorConfig::default(),
            output: OutputConfig {
                csv_path: "unused.csv".to_string(),
            },
        }
    }

    async fn at_listing(site: Arc<StubSite>) -> StubDriver {
        let mut driver = StubDriver::new(site);
        driver.navigate(&format!("{}0", PREFIX)).await.unwrap();
        driver
    }

    #[tokio::test]
    async fn test_normal_card_completes() {
        let site = StubSite::new(
            PREFIX,
            vec![StubPage::with_cards(vec![StubCard::normal("Engineer")])],
        );
        let mut driver = at_listing(site.clone()).await;

        let outcome = extract_card(&mut driver, &test_config(5), 0, 0).await;
        match outcome {
            CardOutcome::Completed(record) => {
                assert_eq!(record.url, site.detail_url(0, 0));
                assert_eq!(record.title, "Engineer");
                assert_eq!(record.description, "Engineer description");
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_intercepted_click_falls_back_to_dispatch() {
        let site = StubSite::new(
            PREFIX,
            vec![StubPage::with_cards(vec![StubCard::with_behavior(
                "Analyst",
                CardBehavior::InterceptedClick,
            )])],
        );
        let mut driver = at_listing(site.clone()).await;

        let outcome = extract_card(&mut driver, &test_config(5), 0, 0).await;
        assert!(matches!(outcome, CardOutcome::Completed(_)));
        // One direct click plus one programmatic dispatch
        assert_eq!(site.click_attempts(0, 0), 2);
    }

    #[tokio::test]
    async fn test_dead_detail_exhausts_exactly_max_retries() {
        let site = StubSite::new(
            PREFIX,
            vec![StubPage::with_cards(vec![StubCard::with_behavior(
                "Ghost",
                CardBehavior::NeverShowsDetail,
            )])],
        );
        let config = test_config(5);
        let mut driver = at_listing(site.clone()).await;

        let outcome = extract_card(&mut driver, &config, 0, 0).await;
        match outcome {
            CardOutcome::Skipped { retries } => assert_eq!(retries, 5),
            other => panic!("expected skip, got {:?}", other),
        }
        // Initial attempt plus one click per retry cycle
        assert_eq!(site.click_attempts(0, 0), 6);
    }

    #[tokio::test]
    async fn test_stale_card_recovers_within_budget() {
        let site = StubSite::new(
            PREFIX,
            vec![StubPage::with_cards(vec![StubCard::with_behavior(
                "Flaky",
                CardBehavior::StaleFirst(2),
            )])],
        );
        let mut driver = at_listing(site).await;

        let outcome = extract_card(&mut driver, &test_config(5), 0, 0).await;
        assert!(matches!(outcome, CardOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_missing_card_index_is_skipped() {
        let site = StubSite::new(PREFIX, vec![StubPage::with_cards(vec![])]);
        let config = test_config(2);
        let mut driver = at_listing(site).await;

        let outcome = extract_card(&mut driver, &config, 0, 7).await;
        assert!(matches!(outcome, CardOutcome::Skipped { retries: 2 }));
    }
}
