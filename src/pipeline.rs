use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing::{info, instrument, warn};

use crate::config::FusionConfig;
use crate::detect::HeaderLocator;
use crate::error::{FusionError, Result};
use crate::io::discovery::{self, DiscoveredFile};
use crate::io::{excel_read, excel_write};
use crate::model::SourceGrid;
use crate::summary::MergeSummary;
use crate::unify::{self, MergeOutcome, SkippedFile};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub summary: MergeSummary,
}

/// Discovers, reads and merges every workbook under `config.data_dir`.
///
/// Files that cannot be read or have no header row are listed in
/// [`MergeOutcome::skipped`] instead of failing the run.
#[instrument(level = "info", skip_all, fields(data_dir = %config.data_dir.display()))]
pub fn merge_directory(config: &FusionConfig) -> Result<MergeOutcome> {
    config.validate()?;

    let files = discovery::discover_xlsx(&config.data_dir)?;
    if files.is_empty() {
        warn!(data_dir = %config.data_dir.display(), "no .xlsx files found");
        return Err(FusionError::NoFilesFound(config.data_dir.clone()));
    }

    let (sources, mut skipped) = read_sources(&files);
    if sources.is_empty() {
        return Err(FusionError::NoUsableFiles {
            discovered: files.len(),
        });
    }

    let locator = HeaderLocator::from_config(&config.detection);
    let mut outcome = unify::merge_sources(&sources, &locator).map_err(|error| match error {
        FusionError::NoUsableFiles { .. } => FusionError::NoUsableFiles {
            discovered: files.len(),
        },
        other => other,
    })?;

    skipped.append(&mut outcome.skipped);
    outcome.skipped = order_by_discovery(skipped, &files);

    info!(
        files = outcome.files.len(),
        skipped = outcome.skipped.len(),
        rows = outcome.table.rows.len(),
        columns = outcome.table.columns.len(),
        "workbooks merged"
    );
    Ok(outcome)
}

/// Runs the whole merge and writes the result to a timestamped workbook in
/// `config.result_dir`.
#[instrument(
    level = "info",
    skip_all,
    fields(data_dir = %config.data_dir.display(), result_dir = %config.result_dir.display())
)]
pub fn run(config: &FusionConfig) -> Result<MergeReport> {
    let outcome = merge_directory(config)?;

    fs::create_dir_all(&config.result_dir)?;
    let output_path =
        excel_write::timestamped_output_path(&config.result_dir, Local::now().naive_local());
    excel_write::write_table(&output_path, &outcome.table)?;
    info!(output = %output_path.display(), "result saved");

    let summary = MergeSummary::new(output_path.clone(), &outcome);
    Ok(MergeReport {
        output_path,
        summary,
    })
}

/// Reads every discovered workbook. Unreadable files are logged and returned
/// as skipped entries.
pub fn read_sources(files: &[DiscoveredFile]) -> (Vec<SourceGrid>, Vec<SkippedFile>) {
    let mut sources = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        match excel_read::read_grid(&file.path) {
            Ok(grid) => {
                info!(source = %file.source_id, rows = grid.len(), "read workbook");
                sources.push(SourceGrid::new(file.source_id.clone(), grid));
            }
            Err(error) => {
                let error = FusionError::UnreadableFile {
                    source_id: file.source_id.clone(),
                    reason: error.to_string(),
                };
                warn!(%error, "skipping file");
                skipped.push(SkippedFile {
                    source_id: file.source_id.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    (sources, skipped)
}

fn order_by_discovery(mut skipped: Vec<SkippedFile>, files: &[DiscoveredFile]) -> Vec<SkippedFile> {
    skipped.sort_by_key(|entry| {
        files
            .iter()
            .position(|file| file.source_id == entry.source_id)
            .unwrap_or(usize::MAX)
    });
    skipped
}
