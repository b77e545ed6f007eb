//! The Navigation Driver abstraction
//!
//! A `NavigationDriver` is one isolated browsing session. Each worker owns
//! exactly one session; sessions are never shared or handed between workers.
//! Lookup outcomes are explicit result values rather than errors so the
//! extraction state machine can make retry decisions without exception-style
//! control flow.

use async_trait::async_trait;
use std::time::Duration;

use super::DriverResult;

/// An opaque reference to an element inside the driver's current document
///
/// Handles are only valid for the document generation they were resolved
/// against; a driver may report them as [`Lookup::Stale`] after navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    selector: String,
    generation: u64,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>, generation: u64) -> Self {
        Self {
            selector: selector.into(),
            generation,
        }
    }

    /// The selector this handle was resolved from
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The document generation this handle belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of a `find` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The element exists in the current document
    Found(ElementHandle),

    /// No element matches the selector
    NotFound,

    /// The selector matched before, but the reference is no longer valid
    Stale,
}

/// Outcome of a `wait_for` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait {
    /// The element appeared within the timeout
    Element(ElementHandle),

    /// The timeout elapsed without the element appearing
    TimedOut,
}

/// One isolated browsing session over the target site
///
/// Errors returned from these methods are session-level problems (transport
/// failures, invalid selectors); expected conditions like "not found" or
/// "timed out" are encoded in [`Lookup`] and [`Wait`].
#[async_trait]
pub trait NavigationDriver: Send {
    /// Loads the given URL, replacing the current document
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Looks up the first element matching a CSS selector
    async fn find(&mut self, selector: &str) -> DriverResult<Lookup>;

    /// Activates an element
    ///
    /// Fails with [`DriverError::ClickIntercepted`] when another element
    /// consumes the click; callers may fall back to [`dispatch_click`].
    ///
    /// [`dispatch_click`]: NavigationDriver::dispatch_click
    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()>;

    /// Programmatic click dispatch, bypassing overlay interception
    async fn dispatch_click(&mut self, element: &ElementHandle) -> DriverResult<()>;

    /// Waits until a selector matches, bounded by `timeout`
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<Wait>;

    /// Reads the text content of an element
    async fn text(&mut self, element: &ElementHandle) -> DriverResult<String>;

    /// The URL of the current document, if any navigation has happened
    fn current_url(&self) -> Option<String>;
}
