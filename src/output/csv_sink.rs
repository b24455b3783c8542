//! CSV dataset sink

use crate::dataset::Dataset;
use crate::output::traits::{OutputResult, Sink, COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the dataset as a UTF-8 CSV file with a header row
///
/// Missing parent directories are created. An existing file is replaced.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for CsvSink {
    fn write(&self, dataset: &Dataset) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for record in dataset.records() {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;

        tracing::info!(
            "Data successfully saved to {} ({} records)",
            self.path.display(),
            dataset.record_count()
        );
        Ok(())
    }
}
