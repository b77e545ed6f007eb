//! Deterministic scripted driver for tests
//!
//! `StubSite` describes a fixed paginated site: which listing pages exist,
//! how many cards each page carries, and how each card misbehaves.
//! `StubDriver` is one browsing session over that script; every worker gets
//! its own driver while the site itself is shared read-only. Waits resolve
//! instantly, so crawl tests stay fast and reproducible.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::record::JobRecord;

use super::{DriverError, DriverResult, ElementHandle, Lookup, NavigationDriver, Wait};

/// Scripted misbehavior for a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBehavior {
    /// Clicks succeed and the detail view appears
    Normal,

    /// Direct clicks are intercepted; the programmatic dispatch succeeds
    InterceptedClick,

    /// The detail view never exposes its markers; every wait times out
    NeverShowsDetail,

    /// The first `n` lookups of this card report a stale reference
    StaleFirst(u32),
}

/// One scripted job card
#[derive(Debug, Clone)]
pub struct StubCard {
    /// Field values served from the detail view (`url` is ignored; the stub
    /// derives detail URLs from page and card index)
    pub fields: JobRecord,
    pub behavior: CardBehavior,
}

impl StubCard {
    /// A well-behaved card with a title and derived description
    pub fn normal(title: &str) -> Self {
        Self::with_behavior(title, CardBehavior::Normal)
    }

    pub fn with_behavior(title: &str, behavior: CardBehavior) -> Self {
        Self {
            fields: JobRecord {
                title: title.to_string(),
                description: format!("{} description", title),
                employment_type: "Full Time".to_string(),
                ..Default::default()
            },
            behavior,
        }
    }
}

/// One scripted listing page
#[derive(Debug, Clone)]
pub struct StubPage {
    /// Whether the card container ever appears on this page
    pub listing_available: bool,
    pub cards: Vec<StubCard>,
}

impl StubPage {
    pub fn with_cards(cards: Vec<StubCard>) -> Self {
        Self {
            listing_available: true,
            cards,
        }
    }

    /// A page whose card container never shows up
    pub fn dead() -> Self {
        Self {
            listing_available: false,
            cards: Vec::new(),
        }
    }
}

/// The scripted site shared by all stub sessions
pub struct StubSite {
    listing_prefix: String,
    pages: Vec<StubPage>,

    // Interaction counters, keyed by (page, card); tests read these to check
    // retry discipline.
    click_attempts: Mutex<HashMap<(u32, usize), u32>>,
    stale_served: Mutex<HashMap<(u32, usize), u32>>,
}

impl StubSite {
    /// Builds a site whose listing URLs are `{listing_prefix}{page}`
    pub fn new(listing_prefix: &str, pages: Vec<StubPage>) -> Arc<Self> {
        Arc::new(Self {
            listing_prefix: listing_prefix.to_string(),
            pages,
            click_attempts: Mutex::new(HashMap::new()),
            stale_served: Mutex::new(HashMap::new()),
        })
    }

    /// The listing URL prefix this site answers to
    pub fn listing_prefix(&self) -> &str {
        &self.listing_prefix
    }

    /// The detail URL the stub reports for a card
    pub fn detail_url(&self, page: u32, card: usize) -> String {
        format!("stub://site/job/{}-{}", page, card)
    }

    /// How many click attempts (direct or dispatched) a card has received
    pub fn click_attempts(&self, page: u32, card: usize) -> u32 {
        *self
            .click_attempts
            .lock()
            .unwrap()
            .get(&(page, card))
            .unwrap_or(&0)
    }

    fn record_click(&self, page: u32, card: usize) {
        *self
            .click_attempts
            .lock()
            .unwrap()
            .entry((page, card))
            .or_insert(0) += 1;
    }

    /// Serves one more stale lookup for the card if its script still owes any
    fn take_stale(&self, page: u32, card: usize, budget: u32) -> bool {
        let mut served = self.stale_served.lock().unwrap();
        let count = served.entry((page, card)).or_insert(0);
        if *count < budget {
            *count += 1;
            true
        } else {
            false
        }
    }

    fn page(&self, page: u32) -> Option<&StubPage> {
        self.pages.get(page as usize)
    }
}

/// Where a stub session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Nowhere,
    Listing(u32),
    Detail(u32, usize),
}

/// One scripted browsing session
pub struct StubDriver {
    site: Arc<StubSite>,
    selectors: crate::config::SelectorConfig,
    location: Location,
    generation: u64,
}

impl StubDriver {
    pub fn new(site: Arc<StubSite>) -> Self {
        Self {
            site,
            selectors: crate::config::SelectorConfig::default(),
            location: Location::Nowhere,
            generation: 0,
        }
    }

    /// Extracts the card index from an id selector like `#job-card-3`
    fn card_index(&self, selector: &str) -> Option<usize> {
        let prefix = format!("#{}", self.selectors.card_id_prefix);
        selector.strip_prefix(&prefix)?.parse().ok()
    }

    /// Maps a detail-view selector to the field it serves
    fn detail_field<'a>(&self, selector: &str, card: &'a StubCard) -> Option<&'a str> {
        let s = &self.selectors;
        let field = if selector == s.detail_title {
            &card.fields.title
        } else if selector == s.detail_description {
            &card.fields.description
        } else if selector == s.detail_location {
            &card.fields.location
        } else if selector == s.detail_employment_type {
            &card.fields.employment_type
        } else if selector == s.detail_seniority {
            &card.fields.seniority
        } else if selector == s.detail_min_experience {
            &card.fields.min_experience
        } else if selector == s.detail_industry {
            &card.fields.industry
        } else if selector == s.detail_salary_range {
            &card.fields.salary_range
        } else if selector == s.detail_skills {
            &card.fields.skills_needed
        } else {
            return None;
        };
        Some(field)
    }

    fn lookup(&self, selector: &str) -> Lookup {
        let found = || Lookup::Found(ElementHandle::new(selector, self.generation));

        match self.location {
            Location::Nowhere => Lookup::NotFound,

            Location::Listing(page) => {
                let Some(scripted) = self.site.page(page) else {
                    return Lookup::NotFound;
                };

                if selector == self.selectors.card_container {
                    if scripted.listing_available {
                        return found();
                    }
                    return Lookup::NotFound;
                }

                if let Some(index) = self.card_index(selector) {
                    let Some(card) = scripted.cards.get(index) else {
                        return Lookup::NotFound;
                    };
                    if let CardBehavior::StaleFirst(budget) = card.behavior {
                        if self.site.take_stale(page, index, budget) {
                            return Lookup::Stale;
                        }
                    }
                    return found();
                }

                Lookup::NotFound
            }

            Location::Detail(page, index) => {
                let card = match self.site.page(page).and_then(|p| p.cards.get(index)) {
                    Some(card) => card,
                    None => return Lookup::NotFound,
                };

                if card.behavior == CardBehavior::NeverShowsDetail {
                    return Lookup::NotFound;
                }

                match self.detail_field(selector, card) {
                    Some(value) if !value.is_empty() => found(),
                    _ => Lookup::NotFound,
                }
            }
        }
    }

    fn click_card(&mut self, element: &ElementHandle, dispatched: bool) -> DriverResult<()> {
        let Location::Listing(page) = self.location else {
            return Err(DriverError::NotClickable {
                selector: element.selector().to_string(),
            });
        };

        let index = self
            .card_index(element.selector())
            .ok_or_else(|| DriverError::NotClickable {
                selector: element.selector().to_string(),
            })?;

        self.site.record_click(page, index);

        let card = self
            .site
            .page(page)
            .and_then(|p| p.cards.get(index))
            .ok_or_else(|| DriverError::NotClickable {
                selector: element.selector().to_string(),
            })?;

        if card.behavior == CardBehavior::InterceptedClick && !dispatched {
            return Err(DriverError::ClickIntercepted {
                selector: element.selector().to_string(),
            });
        }

        self.location = Location::Detail(page, index);
        self.generation += 1;
        Ok(())
    }
}

#[async_trait]
impl NavigationDriver for StubDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        if let Some(rest) = url.strip_prefix(self.site.listing_prefix()) {
            if let Ok(page) = rest.parse::<u32>() {
                self.location = Location::Listing(page);
                self.generation += 1;
                return Ok(());
            }
        }

        self.location = Location::Nowhere;
        self.generation += 1;
        Ok(())
    }

    async fn find(&mut self, selector: &str) -> DriverResult<Lookup> {
        Ok(self.lookup(selector))
    }

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        self.click_card(element, false)
    }

    async fn dispatch_click(&mut self, element: &ElementHandle) -> DriverResult<()> {
        self.click_card(element, true)
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> DriverResult<Wait> {
        // The scripted site never changes on its own; resolve immediately.
        match self.lookup(selector) {
            Lookup::Found(handle) => Ok(Wait::Element(handle)),
            Lookup::NotFound | Lookup::Stale => Ok(Wait::TimedOut),
        }
    }

    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String> {
        if let Location::Detail(page, index) = self.location {
            if let Some(card) = self.site.page(page).and_then(|p| p.cards.get(index)) {
                if let Some(value) = self.detail_field(element.selector(), card) {
                    return Ok(value.to_string());
                }
            }
        }
        Ok(String::new())
    }

    fn current_url(&self) -> Option<String> {
        match self.location {
            Location::Nowhere => None,
            Location::Listing(page) => {
                Some(format!("{}{}", self.site.listing_prefix(), page))
            }
            Location::Detail(page, index) => Some(self.site.detail_url(page, index)),
        }
    }
}
