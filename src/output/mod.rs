//! Record output
//!
//! The crawl produces to an append-only [`RecordSink`]; the shipped adapter
//! writes the fixed 10-column CSV schema.

mod csv_sink;
mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::CrawlSummary;
pub use traits::{OutputError, OutputResult, RecordSink};
