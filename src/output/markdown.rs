//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a harvest run:
//! where the data came from, how many pages succeeded, and which pages were
//! skipped.

use crate::output::traits::{HarvestSummary, OutputResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a harvest run
///
/// # Arguments
///
/// * `summary` - The harvest summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    summary: &HarvestSummary,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a harvest summary as markdown
pub fn format_markdown_summary(summary: &HarvestSummary) -> String {
    let stats = &summary.statistics;
    let mut md = String::new();

    md.push_str("# Catalog-Harvest Run Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Source**: {}\n", summary.source_url));
    md.push_str(&format!("- **Dataset**: {}\n", summary.csv_path));
    md.push_str(&format!("- **Started**: {}\n", stats.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", stats.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        stats.duration_seconds(),
        stats.duration_seconds() as f64 / 60.0
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Total Records**: {}\n", stats.total_records));
    md.push_str(&format!("- **Total Attempts**: {}\n", stats.total_attempts));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Outcome breakdown
    md.push_str("## Page Outcome Breakdown\n\n");
    md.push_str("| Outcome | Pages |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| With records | {} |\n", stats.pages_with_records));
    md.push_str(&format!("| Empty | {} |\n", stats.pages_empty));
    md.push_str(&format!("| Exhausted | {} |\n", stats.pages_exhausted));
    md.push_str(&format!("| Needed retries | {} |\n\n", stats.pages_retried));

    // Skipped pages
    if !stats.skipped_pages.is_empty() {
        md.push_str("## Skipped Pages\n\n");
        md.push_str("These pages yielded no records after every attempt failed.\n\n");
        for page in &stats.skipped_pages {
            md.push_str(&format!("- {}\n", page));
        }
        md.push('\n');
    }

    md
}
