//! Sink trait and output error types
//!
//! A sink receives the finished dataset once, after the last batch.

use crate::dataset::Dataset;
use crate::output::stats::HarvestStatistics;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Column names of a persisted dataset, in record field order
pub const COLUMNS: [&str; 4] = ["Title", "Author", "Rating", "Want to Read"];

/// Trait for dataset sinks
///
/// Each record is persisted as one row with the columns in `COLUMNS`;
/// encoding and file format are up to the implementation.
pub trait Sink {
    /// Persists every record of `dataset`
    fn write(&self, dataset: &Dataset) -> OutputResult<()>;
}

/// Everything the run summary reports
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// Listing URL the pages were derived from
    pub source_url: String,

    /// Where the dataset was written
    pub csv_path: String,

    /// SHA-256 of the configuration file, when known
    pub config_hash: Option<String>,

    pub statistics: HarvestStatistics,
}
