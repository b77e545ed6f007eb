//! Jobharvest: a concurrent job-posting extraction engine
//!
//! This crate drives remote browsing sessions over a paginated, dynamically
//! rendered job-listing site: it enumerates the cards on each result page,
//! opens each card's detail view, extracts a fixed set of fields, and appends
//! the records to an append-only CSV sink, with retry/backoff and randomized
//! rate limiting throughout.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for jobharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid card state transition: {from:?} -> {to:?}")]
    InvalidCardTransition {
        from: state::CardState,
        to: state::CardState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for jobharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, run_crawl_with, CancelFlag};
pub use driver::{ElementHandle, Lookup, NavigationDriver, Wait};
pub use output::CrawlSummary;
pub use record::JobRecord;
pub use state::{CardState, PageStatus};
