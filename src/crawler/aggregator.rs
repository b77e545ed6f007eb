//! Result aggregation and sink handoff
//!
//! Workers accumulate records locally; this is the single join point where
//! their outcomes are merged, deduplicated by URL, and appended to the sink.
//! Partial results from a cancelled run flow through the same path.

use crate::config::Config;
use crate::crawler::worker::PageOutcome;
use crate::output::{CrawlSummary, RecordSink};
use crate::record::JobRecord;
use crate::state::PageStatus;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Merges per-page record lists, deduplicating by URL
///
/// Last write wins: a later outcome's record replaces an earlier one with
/// the same URL. Returns the merged list and the number of duplicates
/// dropped.
pub fn merge_records(outcomes: &[PageOutcome]) -> (Vec<JobRecord>, usize) {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<JobRecord> = Vec::new();
    let mut duplicates = 0;

    for outcome in outcomes {
        for record in &outcome.records {
            if !record.is_valid() {
                tracing::warn!("Dropping record with empty URL during merge");
                continue;
            }
            match positions.get(&record.url) {
                Some(&at) => {
                    merged[at] = record.clone();
                    duplicates += 1;
                }
                None => {
                    positions.insert(record.url.clone(), merged.len());
                    merged.push(record.clone());
                }
            }
        }
    }

    (merged, duplicates)
}

/// Owns the sink handle and produces the run summary
pub struct Aggregator<S: RecordSink> {
    sink: S,
}

impl<S: RecordSink> Aggregator<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Merges all outcomes, appends to the sink, and summarizes the run
    pub fn finish(
        mut self,
        config: &Config,
        outcomes: &[PageOutcome],
        started_at: DateTime<Utc>,
    ) -> crate::Result<CrawlSummary> {
        let (merged, duplicates_dropped) = merge_records(outcomes);
        let records_written = self.sink.append(&merged)?;

        let pages_failed = outcomes
            .iter()
            .filter(|o| o.status == PageStatus::Failed)
            .count() as u32;

        // Pending outcomes plus any page that produced no outcome at all
        let pages_unattempted = outcomes
            .iter()
            .filter(|o| o.status == PageStatus::Pending)
            .count() as u32
            + config.crawl.page_count.saturating_sub(outcomes.len() as u32);

        Ok(CrawlSummary {
            pages_total: config.crawl.page_count,
            pages_failed,
            pages_unattempted,
            cards_found: outcomes.iter().map(|o| o.cards_found).sum(),
            cards_skipped: outcomes.iter().map(|o| o.skipped.len()).sum(),
            records_written,
            duplicates_dropped,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputResult;

    fn record(url: &str, title: &str) -> JobRecord {
        JobRecord {
            url: url.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn outcome(page: u32, records: Vec<JobRecord>) -> PageOutcome {
        PageOutcome {
            page,
            status: PageStatus::Done,
            cards_found: records.len(),
            records,
            skipped: Vec::new(),
        }
    }

    /// In-memory sink for aggregation tests
    struct VecSink(Vec<JobRecord>);

    impl RecordSink for VecSink {
        fn append(&mut self, records: &[JobRecord]) -> OutputResult<usize> {
            self.0.extend(records.iter().cloned());
            Ok(records.len())
        }
    }

    #[test]
    fn test_merge_keeps_distinct_urls() {
        let outcomes = vec![
            outcome(0, vec![record("https://x/1", "A"), record("https://x/2", "B")]),
            outcome(1, vec![record("https://x/3", "C")]),
        ];

        let (merged, duplicates) = merge_records(&outcomes);
        assert_eq!(merged.len(), 3);
        assert_eq!(duplicates, 0);
    }

    #[test]
    fn test_merge_dedups_last_write_wins() {
        let outcomes = vec![
            outcome(0, vec![record("https://x/1", "first")]),
            outcome(1, vec![record("https://x/1", "second")]),
        ];

        let (merged, duplicates) = merge_records(&outcomes);
        assert_eq!(merged.len(), 1);
        assert_eq!(duplicates, 1);
        assert_eq!(merged[0].title, "second");
    }

    #[test]
    fn test_merge_drops_invalid_records() {
        let outcomes = vec![outcome(0, vec![record("", "ghost"), record("https://x/1", "A")])];

        let (merged, _) = merge_records(&outcomes);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://x/1");
    }

    #[test]
    fn test_finish_counts_page_states() {
        use crate::config::{Config, CrawlConfig, OutputConfig, SelectorConfig, TargetConfig};

        let config = Config {
            crawl: CrawlConfig {
                page_count: 3,
                worker_count: 1,
                max_retries: 5,
                per_request_timeout_ms: 15_000,
                backoff_base_ms: 2_000,
                backoff_max_ms: 120_000,
                rate_limit_min_ms: 2_000,
                rate_limit_max_ms: 5_000,
            },
            target: TargetConfig {
                listing_url: "https://example.com/search?page=".to_string(),
                user_agent: None,
            },
            selectors: SelectorConfig::default(),
            output: OutputConfig {
                csv_path: "unused.csv".to_string(),
            },
        };

        let outcomes = vec![
            outcome(0, vec![record("https://x/1", "A")]),
            PageOutcome::failed(1),
            PageOutcome::unattempted(2),
        ];

        let summary = Aggregator::new(VecSink(Vec::new()))
            .finish(&config, &outcomes, Utc::now())
            .unwrap();

        assert_eq!(summary.pages_total, 3);
        assert_eq!(summary.pages_failed, 1);
        assert_eq!(summary.pages_unattempted, 1);
        assert_eq!(summary.records_written, 1);
    }
}
