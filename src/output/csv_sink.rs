//! CSV record sink
//!
//! Appends records to a fixed 10-column CSV file. The header row is written
//! only when the destination is created (or is empty); appending to a
//! populated file never duplicates it, so partial output from a crashed run
//! is preserved across re-runs.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::{JobRecord, HEADER};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Append-only CSV adapter over a file path
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the destination already holds a header row
    fn has_header(&self) -> bool {
        match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() > 0,
            Err(_) => false,
        }
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, records: &[JobRecord]) -> OutputResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let needs_header = !self.has_header();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Header written manually so appends can skip it
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(HEADER)?;
        }

        let mut written = 0;
        for record in records {
            if !record.is_valid() {
                tracing::warn!("Discarding record with empty URL before write");
                continue;
            }
            writer.serialize(record)?;
            written += 1;
        }

        writer.flush()?;
        tracing::debug!("Appended {} records to {}", written, self.path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str, title: &str) -> JobRecord {
        JobRecord {
            url: url.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        let mut sink = CsvSink::new(&path);

        let written = sink
            .append(&[record("https://example.com/job/1", "Engineer")])
            .unwrap();
        assert_eq!(written, 1);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Job URL,Job Title"));
        assert!(lines[1].contains("https://example.com/job/1"));
    }

    #[test]
    fn test_second_append_skips_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");

        let mut sink = CsvSink::new(&path);
        sink.append(&[record("https://example.com/job/1", "Engineer")])
            .unwrap();

        // A separate run over the same destination
        let mut sink = CsvSink::new(&path);
        sink.append(&[record("https://example.com/job/2", "Analyst")])
            .unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        let header_rows = lines.iter().filter(|l| l.starts_with("Job URL")).count();
        assert_eq!(header_rows, 1);
    }

    #[test]
    fn test_invalid_records_never_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        let mut sink = CsvSink::new(&path);

        let written = sink
            .append(&[
                record("", "No identity"),
                record("https://example.com/job/1", "Engineer"),
            ])
            .unwrap();
        assert_eq!(written, 1);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(!lines.iter().any(|l| l.contains("No identity")));
    }

    #[test]
    fn test_empty_append_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        let mut sink = CsvSink::new(&path);

        assert_eq!(sink.append(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_row_has_ten_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.csv");
        let mut sink = CsvSink::new(&path);

        sink.append(&[record("https://example.com/job/1", "Engineer")])
            .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 10);
        for row in reader.records() {
            assert_eq!(row.unwrap().len(), 10);
        }
    }
}
