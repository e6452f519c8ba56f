//! Column unification.
//!
//! Each located grid contributes its header cells to an insertion-ordered
//! union. Data rows are re-aligned to the union, rows without any value are
//! dropped and every row is tagged with its source identifier.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::detect::{HeaderClassifier, HeaderLocator};
use crate::error::{FusionError, Result};
use crate::model::{Cell, ConsolidatedRow, ConsolidatedTable, SOURCE_COLUMN, SourceGrid};

/// Insertion-ordered set of column names. Identity is exact string equality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderUnion {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl HeaderUnion {
    /// Adds `name` if it is new and returns its position in the union.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(position) = self.position(name) {
            return position;
        }
        let position = self.names.len();
        self.index.insert(name.to_string(), position);
        self.names.push(name.to_string());
        position
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// A grid whose header row is known.
#[derive(Debug, Clone, Copy)]
pub struct LocatedGrid<'a> {
    pub source_id: &'a str,
    pub header_index: usize,
    pub grid: &'a [Vec<Cell>],
}

/// What one merged file contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source_id: String,
    pub header_index: usize,
    pub columns: usize,
    pub rows: usize,
    pub empty_rows_dropped: usize,
}

/// A file left out of the merge and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub source_id: String,
    pub reason: String,
}

/// A header cell of one file that survived cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocalColumn {
    cell_index: usize,
    union_index: usize,
}

/// Accumulates located grids into a [`ConsolidatedTable`].
#[derive(Debug, Default)]
pub struct TableUnifier {
    union: HeaderUnion,
    rows: Vec<ConsolidatedRow>,
    reports: Vec<FileReport>,
}

impl TableUnifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the data rows of one file. Files are appended in call order.
    pub fn add(&mut self, located: LocatedGrid<'_>) {
        let header = located
            .grid
            .get(located.header_index)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let columns = self.register_headers(located.source_id, header);

        let mut rows = 0;
        let mut empty_rows_dropped = 0;
        for row in located.grid.iter().skip(located.header_index.saturating_add(1)) {
            match map_row(row, &columns, self.union.len()) {
                Some(values) => {
                    self.rows.push(ConsolidatedRow {
                        values,
                        source_file: located.source_id.to_string(),
                    });
                    rows += 1;
                }
                None => empty_rows_dropped += 1,
            }
        }

        debug!(
            source = located.source_id,
            header_index = located.header_index,
            columns = columns.len(),
            rows,
            empty_rows_dropped,
            "file unified"
        );

        self.reports.push(FileReport {
            source_id: located.source_id.to_string(),
            header_index: located.header_index,
            columns: columns.len(),
            rows,
            empty_rows_dropped,
        });
    }

    fn register_headers(&mut self, source_id: &str, header: &[Cell]) -> Vec<LocalColumn> {
        let mut local_names: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::new();

        for (cell_index, cell) in header.iter().enumerate() {
            let name = cell.to_string();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if name == SOURCE_COLUMN {
                warn!(source = source_id, column = cell_index, "ignoring column named '{SOURCE_COLUMN}'");
                continue;
            }
            if let Some(first) = local_names.get(name) {
                warn!(
                    source = source_id,
                    header = name,
                    kept = *first,
                    ignored = cell_index,
                    "duplicate header in file, keeping first column"
                );
                continue;
            }
            local_names.insert(name.to_string(), cell_index);
            columns.push(LocalColumn {
                cell_index,
                union_index: self.union.insert(name),
            });
        }

        columns
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    /// Pads every row to the final union width and returns the table with the
    /// per-file reports.
    pub fn finish(self) -> (ConsolidatedTable, Vec<FileReport>) {
        let width = self.union.len();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                row.values.resize(width, Cell::Empty);
                row
            })
            .collect();

        let table = ConsolidatedTable {
            columns: self.union.into_names(),
            rows,
        };
        (table, self.reports)
    }
}

/// Maps a data row onto union positions. Returns `None` when every cell under
/// the file's columns is blank.
fn map_row(row: &[Cell], columns: &[LocalColumn], width: usize) -> Option<Vec<Cell>> {
    let mut values = vec![Cell::Empty; width];
    let mut filled = false;
    for column in columns {
        let cell = row.get(column.cell_index).cloned().unwrap_or_default();
        if !cell.is_blank() {
            filled = true;
        }
        values[column.union_index] = cell;
    }
    filled.then_some(values)
}

/// Unifies grids whose header rows are already known.
pub fn unify(inputs: &[LocatedGrid<'_>]) -> (ConsolidatedTable, Vec<FileReport>) {
    let mut unifier = TableUnifier::new();
    for located in inputs {
        unifier.add(*located);
    }
    unifier.finish()
}

/// Result of merging a batch of grids.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: ConsolidatedTable,
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
}

/// Locates the header of every source and unifies the ones that have one.
///
/// Sources without a detectable header are skipped with a warning. The call
/// fails with [`FusionError::NoUsableFiles`] when no source could be merged,
/// including when `sources` is empty.
pub fn merge_sources<C: HeaderClassifier>(
    sources: &[SourceGrid],
    locator: &HeaderLocator<C>,
) -> Result<MergeOutcome> {
    let mut unifier = TableUnifier::new();
    let mut skipped = Vec::new();

    for source in sources {
        match locator.locate(&source.grid) {
            Ok(header_index) => {
                debug!(source = %source.source_id, header_index, "header row located");
                unifier.add(LocatedGrid {
                    source_id: &source.source_id,
                    header_index,
                    grid: &source.grid,
                });
            }
            Err(error) if error.is_per_file() => {
                warn!(source = %source.source_id, %error, "skipping file");
                skipped.push(SkippedFile {
                    source_id: source.source_id.clone(),
                    reason: error.to_string(),
                });
            }
            Err(error) => return Err(error),
        }
    }

    if unifier.reports().is_empty() {
        return Err(FusionError::NoUsableFiles {
            discovered: sources.len(),
        });
    }

    let (table, files) = unifier.finish();
    Ok(MergeOutcome {
        table,
        files,
        skipped,
    })
}
