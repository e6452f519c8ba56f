use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, FusionError>;

/// Error type covering the different failure cases that can occur while
/// discovering, reading, merging, or writing spreadsheets.
///
/// Some variants only ever describe a single source file (`HeaderNotFound`,
/// `EmptyFile`, `UnreadableFile`). The pipeline recovers from those by
/// skipping the file; see [`FusionError::is_per_file`].
#[derive(Debug, Error)]
pub enum FusionError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// No row inside the scan window looks like a header row.
    #[error("no header row found in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    /// The sheet has no rows at all.
    #[error("file contains no rows")]
    EmptyFile,

    /// A single source file could not be opened or parsed.
    #[error("cannot read {source_id}: {reason}")]
    UnreadableFile { source_id: String, reason: String },

    /// Discovery found no workbook under the data directory.
    #[error("no .xlsx files found under {}", .0.display())]
    NoFilesFound(PathBuf),

    /// Every discovered file was skipped.
    #[error("none of the {discovered} discovered files could be merged")]
    NoUsableFiles { discovered: usize },

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when detection settings are out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl FusionError {
    /// Returns `true` for errors that only concern one source file and
    /// therefore must not abort the whole batch.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            FusionError::HeaderNotFound { .. }
                | FusionError::EmptyFile
                | FusionError::UnreadableFile { .. }
        )
    }
}
