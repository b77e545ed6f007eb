//! Run summary statistics

use chrono::{DateTime, Utc};

/// Summary of one crawl run
///
/// A run always terminates with a summary, whatever the pages did; failures
/// show up as counts here rather than as an aborted run.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Pages in the configured range
    pub pages_total: u32,

    /// Pages whose listing never became navigable
    pub pages_failed: u32,

    /// Pages never attempted because the run was cancelled
    pub pages_unattempted: u32,

    /// Cards discovered across all attempted pages
    pub cards_found: usize,

    /// Cards skipped after exhausting retries
    pub cards_skipped: usize,

    /// Records appended to the sink
    pub records_written: usize,

    /// Records dropped by URL deduplication within the run
    pub duplicates_dropped: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Emits the summary through the logging layer
    pub fn log(&self) {
        tracing::info!(
            "Run finished: {}/{} pages ok ({} failed, {} unattempted), \
             {} cards found, {} skipped, {} records written, {} duplicates dropped, {}s",
            self.pages_total - self.pages_failed - self.pages_unattempted,
            self.pages_total,
            self.pages_failed,
            self.pages_unattempted,
            self.cards_found,
            self.cards_skipped,
            self.records_written,
            self.duplicates_dropped,
            self.duration_seconds()
        );
    }
}
