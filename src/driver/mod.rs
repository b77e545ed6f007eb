//! Browsing session drivers
//!
//! The crawl core is protocol-agnostic: it talks to the target site through
//! the [`NavigationDriver`] trait. Two implementations ship with the crate:
//! [`HttpDriver`] for server-rendered targets, and [`StubDriver`], a
//! deterministic scripted site used by the test suite.

mod http;
mod stub;
mod traits;

use thiserror::Error;

pub use http::HttpDriver;
pub use stub::{CardBehavior, StubCard, StubDriver, StubPage, StubSite};
pub use traits::{ElementHandle, Lookup, NavigationDriver, Wait};

/// Session-level driver errors
///
/// Expected conditions (element missing, wait timed out) are not errors; see
/// [`Lookup`] and [`Wait`].
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Click on {selector} was intercepted by another element")]
    ClickIntercepted { selector: String },

    #[error("Element {selector} is not activatable")]
    NotClickable { selector: String },

    #[error("Stale element handle for {selector}")]
    StaleElement { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Session error: {0}")]
    Session(String),
}

/// Result type alias for driver operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;
