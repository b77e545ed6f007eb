use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for jobharvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Number of listing pages to crawl
    #[serde(rename = "page-count")]
    pub page_count: u32,

    /// Number of concurrent workers (one browsing session each)
    #[serde(rename = "worker-count")]
    pub worker_count: u32,

    /// Maximum retry cycles per card before it is skipped
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout for every navigation/DOM wait (milliseconds)
    #[serde(rename = "per-request-timeout-ms", default = "default_timeout_ms")]
    pub per_request_timeout_ms: u64,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Cap for exponential backoff (milliseconds)
    #[serde(rename = "backoff-max-ms", default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Lower bound of the random pause between completed cards (milliseconds)
    #[serde(rename = "rate-limit-min-ms", default = "default_rate_min_ms")]
    pub rate_limit_min_ms: u64,

    /// Upper bound of the random pause between completed cards (milliseconds)
    #[serde(rename = "rate-limit-max-ms", default = "default_rate_max_ms")]
    pub rate_limit_max_ms: u64,
}

impl CrawlConfig {
    /// The bounded wait applied to every `wait_for` call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.per_request_timeout_ms)
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_backoff_base_ms() -> u64 {
    2_000
}

fn default_backoff_max_ms() -> u64 {
    120_000
}

fn default_rate_min_ms() -> u64 {
    2_000
}

fn default_rate_max_ms() -> u64 {
    5_000
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Listing URL prefix; the page number is appended to it
    /// (e.g. "https://example.com/search?sortBy=relevancy&page=")
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Optional user agent override for the browsing session
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// CSS selectors addressing the listing and detail views
///
/// The defaults match the data-testid markers of the original target site.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Marker for the card container on a listing page
    #[serde(rename = "card-container", default = "default_card_container")]
    pub card_container: String,

    /// Per-page sequential card id prefix ("job-card-" yields #job-card-0, ...)
    #[serde(rename = "card-id-prefix", default = "default_card_id_prefix")]
    pub card_id_prefix: String,

    /// Detail-view title marker (also the first readiness marker)
    #[serde(rename = "detail-title", default = "default_detail_title")]
    pub detail_title: String,

    /// Detail-view description marker (also the second readiness marker)
    #[serde(rename = "detail-description", default = "default_detail_description")]
    pub detail_description: String,

    #[serde(rename = "detail-location", default = "default_detail_location")]
    pub detail_location: String,

    #[serde(rename = "detail-employment-type", default = "default_detail_employment_type")]
    pub detail_employment_type: String,

    #[serde(rename = "detail-seniority", default = "default_detail_seniority")]
    pub detail_seniority: String,

    #[serde(rename = "detail-min-experience", default = "default_detail_min_experience")]
    pub detail_min_experience: String,

    #[serde(rename = "detail-industry", default = "default_detail_industry")]
    pub detail_industry: String,

    #[serde(rename = "detail-salary-range", default = "default_detail_salary_range")]
    pub detail_salary_range: String,

    #[serde(rename = "detail-skills", default = "default_detail_skills")]
    pub detail_skills: String,
}

impl SelectorConfig {
    /// Builds the id selector for the card at `index`
    pub fn card_selector(&self, index: usize) -> String {
        format!("#{}{}", self.card_id_prefix, index)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card_container: default_card_container(),
            card_id_prefix: default_card_id_prefix(),
            detail_title: default_detail_title(),
            detail_description: default_detail_description(),
            detail_location: default_detail_location(),
            detail_employment_type: default_detail_employment_type(),
            detail_seniority: default_detail_seniority(),
            detail_min_experience: default_detail_min_experience(),
            detail_industry: default_detail_industry(),
            detail_salary_range: default_detail_salary_range(),
            detail_skills: default_detail_skills(),
        }
    }
}

fn default_card_container() -> String {
    "div[data-testid='card-list']".to_string()
}

fn default_card_id_prefix() -> String {
    "job-card-".to_string()
}

fn default_detail_title() -> String {
    "h1[data-testid='job-details-info-job-title']".to_string()
}

fn default_detail_description() -> String {
    "div[data-testid='description-content']".to_string()
}

fn default_detail_location() -> String {
    "a[data-testid='job-details-info-location-map']".to_string()
}

fn default_detail_employment_type() -> String {
    "p[data-testid='job-details-info-employment-type']".to_string()
}

fn default_detail_seniority() -> String {
    "p[data-testid='job-details-info-seniority']".to_string()
}

fn default_detail_min_experience() -> String {
    "p[data-testid='job-details-info-min-experience']".to_string()
}

fn default_detail_industry() -> String {
    "p[data-testid='job-details-info-job-categories']".to_string()
}

fn default_detail_salary_range() -> String {
    "span[data-testid='salary-range']".to_string()
}

fn default_detail_skills() -> String {
    "div[data-testid='multi-pill-button']".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV record sink
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}
