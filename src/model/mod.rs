use std::fmt;

/// Name of the column appended to every merged row to record where it came
/// from.
pub const SOURCE_COLUMN: &str = "source_file";

/// A single spreadsheet cell value. Values are carried through the merge
/// unchanged; no type coercion happens anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing or null cell.
    #[default]
    Empty,
    /// Text cell, also used for dates and error values rendered by the reader.
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
}

impl Cell {
    /// Builds a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// A cell is blank when it is empty or holds whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(value) => value.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(value) => f.write_str(value),
            Cell::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            Cell::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

/// Unparsed row/column content of one source file.
pub type RawGrid = Vec<Vec<Cell>>;

/// Counts the non-blank cells in a row.
pub fn filled_count(row: &[Cell]) -> usize {
    row.iter().filter(|cell| !cell.is_blank()).count()
}

/// One input to the merge: the grid of a source file and its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGrid {
    pub source_id: String,
    pub grid: RawGrid,
}

impl SourceGrid {
    pub fn new(source_id: impl Into<String>, grid: RawGrid) -> Self {
        Self {
            source_id: source_id.into(),
            grid,
        }
    }
}

/// A merged row. `values` is aligned with [`ConsolidatedTable::columns`], so
/// every row carries exactly the unified column set plus its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRow {
    pub values: Vec<Cell>,
    pub source_file: String,
}

/// The merged output: unified columns (without the source column) and rows in
/// file-processing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    /// Final column order: unified headers followed by [`SOURCE_COLUMN`].
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.columns.len() + 1);
        names.extend(self.columns.iter().cloned());
        names.push(SOURCE_COLUMN.to_string());
        names
    }

    /// Renders every row as display strings in [`Self::column_names`] order.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row.values.iter().map(Cell::to_string).collect();
                cells.push(row.source_file.clone());
                cells
            })
            .collect()
    }
}
