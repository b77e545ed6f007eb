//! The extracted job-posting record
//!
//! One `JobRecord` corresponds to one opened card detail view. The serialized
//! field names match the legacy 10-column CSV header so that output files stay
//! compatible across runs.

use serde::Serialize;

/// A single extracted job posting
///
/// `url` is the record's identity and dedup key. Every other field is
/// best-effort: a selector that matches nothing yields an empty string and the
/// record is still emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    #[serde(rename = "Job URL")]
    pub url: String,

    #[serde(rename = "Job Title")]
    pub title: String,

    #[serde(rename = "Job Location")]
    pub location: String,

    #[serde(rename = "Job Employment Type")]
    pub employment_type: String,

    #[serde(rename = "Job Seniority")]
    pub seniority: String,

    #[serde(rename = "Job Minimum Experience")]
    pub min_experience: String,

    #[serde(rename = "Job Industry")]
    pub industry: String,

    #[serde(rename = "Job Salary Range")]
    pub salary_range: String,

    #[serde(rename = "Job Description")]
    pub description: String,

    #[serde(rename = "Job Skills Needed")]
    pub skills_needed: String,
}

/// Number of columns in the sink schema
pub const FIELD_COUNT: usize = 10;

/// The CSV header row, in schema order
pub const HEADER: [&str; FIELD_COUNT] = [
    "Job URL",
    "Job Title",
    "Job Location",
    "Job Employment Type",
    "Job Seniority",
    "Job Minimum Experience",
    "Job Industry",
    "Job Salary Range",
    "Job Description",
    "Job Skills Needed",
];

impl JobRecord {
    /// Returns true if the record may be written to the sink
    ///
    /// A record without a URL has no identity and is discarded.
    pub fn is_valid(&self) -> bool {
        !self.url.is_empty()
    }
}
