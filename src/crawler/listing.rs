//! Listing navigation and card enumeration
//!
//! A listing page is loaded by URL, validated by waiting for its card
//! container marker, and enumerated by probing increasing card indices until
//! the first miss. The card count is discovered per page, never assumed.

use crate::config::{Config, SelectorConfig};
use crate::driver::{DriverResult, Lookup, NavigationDriver, Wait};

/// Builds the URL of a listing page by appending the page number
pub fn listing_url(base: &str, page: u32) -> String {
    format!("{}{}", base, page)
}

/// Navigates to a listing page and waits for its card container
///
/// Returns false if the container never appears within the per-request
/// timeout; that is a page-level failure, not a per-card one.
pub async fn open_listing<D>(driver: &mut D, config: &Config, page: u32) -> DriverResult<bool>
where
    D: NavigationDriver + ?Sized,
{
    let url = listing_url(&config.target.listing_url, page);
    driver.navigate(&url).await?;

    let wait = driver
        .wait_for(&config.selectors.card_container, config.crawl.request_timeout())
        .await?;

    Ok(matches!(wait, Wait::Element(_)))
}

/// Finite, non-restartable card index sequence
///
/// Probes `#job-card-0`, `#job-card-1`, ... and halts permanently on the
/// first index that is not found. A stale reference still proves the card
/// exists, so it counts as present.
pub struct CardProbe {
    next_index: usize,
    exhausted: bool,
}

impl CardProbe {
    pub fn new() -> Self {
        Self {
            next_index: 0,
            exhausted: false,
        }
    }

    /// Probes the next index; `None` once the sequence has ended
    pub async fn next<D>(
        &mut self,
        driver: &mut D,
        selectors: &SelectorConfig,
    ) -> DriverResult<Option<usize>>
    where
        D: NavigationDriver + ?Sized,
    {
        if self.exhausted {
            return Ok(None);
        }

        let selector = selectors.card_selector(self.next_index);
        match driver.find(&selector).await? {
            Lookup::Found(_) | Lookup::Stale => {
                let index = self.next_index;
                self.next_index += 1;
                Ok(Some(index))
            }
            Lookup::NotFound => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

impl Default for CardProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the probe to fix the card count for a page
pub async fn count_cards<D>(driver: &mut D, selectors: &SelectorConfig) -> DriverResult<usize>
where
    D: NavigationDriver + ?Sized,
{
    let mut probe = CardProbe::new();
    let mut count = 0;
    while probe.next(driver, selectors).await?.is_some() {
        count += 1;
    }
    Ok(count)
}
