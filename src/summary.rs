use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::unify::{FileReport, MergeOutcome, SkippedFile};

/// End-of-run report shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeSummary {
    pub output: PathBuf,
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

impl MergeSummary {
    pub fn new(output: PathBuf, outcome: &MergeOutcome) -> Self {
        Self {
            output,
            total_rows: outcome.table.rows.len(),
            columns: outcome.table.column_names(),
            files: outcome.files.clone(),
            skipped: outcome.skipped.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files merged: {}", self.files.len())?;
        writeln!(f, "Total data rows: {}", self.total_rows)?;
        writeln!(f, "Number of columns: {}", self.columns.len())?;

        writeln!(f, "\nRows by file:")?;
        for file in &self.files {
            writeln!(
                f,
                "  - {}: {} rows (header at row {})",
                file.source_id,
                file.rows,
                file.header_index + 1
            )?;
        }

        if !self.skipped.is_empty() {
            writeln!(f, "\nSkipped files:")?;
            for file in &self.skipped {
                writeln!(f, "  - {}: {}", file.source_id, file.reason)?;
            }
        }

        writeln!(f, "\nColumns:")?;
        for (index, column) in self.columns.iter().enumerate() {
            writeln!(f, "  {:2}. {column}", index + 1)?;
        }

        write!(f, "\nOutput: {}", self.output.display())
    }
}
