use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::error::Result;
use crate::model::{Cell, RawGrid};

/// Reads the first worksheet of an `.xlsx` workbook as a raw grid.
///
/// A workbook without worksheets yields an empty grid.
pub fn read_grid(path: &Path) -> Result<RawGrid> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    let grid = range_to_grid(&range);
    debug!(
        path = %path.display(),
        rows = grid.len(),
        "worksheet loaded"
    );
    Ok(grid)
}

/// Converts a calamine range into a grid anchored at cell `A1`.
///
/// Calamine trims leading empty rows and columns from a range; they are put
/// back so that row offsets match what the user sees in the sheet.
fn range_to_grid(range: &Range<DataType>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut grid: RawGrid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = Vec::with_capacity(start_col as usize + row.len());
        cells.resize(start_col as usize, Cell::Empty);
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }
    grid
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) if value.is_empty() => Cell::Empty,
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::DateTime(serial) => match cell.as_datetime() {
            Some(datetime) => Cell::Text(format_datetime(datetime)),
            None => Cell::Number(*serial),
        },
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    if datetime.num_seconds_from_midnight() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
