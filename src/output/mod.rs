//! Output module for persisting harvested data and run reports
//!
//! This module handles:
//! - Writing the dataset through a `Sink` (CSV by default)
//! - Computing and printing run statistics
//! - Generating markdown run summaries

mod csv_sink;
mod markdown;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, HarvestStatistics};
pub use traits::{HarvestSummary, OutputError, OutputResult, Sink, COLUMNS};
