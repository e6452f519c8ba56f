use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{Cell, ConsolidatedTable};

/// Name of the single worksheet in the output workbook.
pub const OUTPUT_SHEET: &str = "Merged";
/// `chrono` format of output file stems.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes the merged table to `path`: header row first, then one row per
/// merged record, with [`crate::model::SOURCE_COLUMN`] last.
pub fn write_table(path: &Path, table: &ConsolidatedTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET)?;

    let header_format = Format::new().set_bold();
    let columns = table.column_names();
    for (col_idx, header) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    let source_col = table.columns.len() as u16;
    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.values.iter().enumerate() {
            write_cell(worksheet, excel_row, col_idx as u16, cell)?;
        }
        worksheet.write_string(excel_row, source_col, &row.source_file)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofilter(0, 0, table.rows.len() as u32, source_col)?;

    workbook.save(path)?;
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        Cell::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
    }
    Ok(())
}

/// Returns `<dir>/<timestamp>.xlsx`, adding `_1`, `_2`, ... when a file with
/// that name already exists.
pub fn timestamped_output_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    let stem = now.format(TIMESTAMP_FORMAT).to_string();
    let mut candidate = dir.join(format!("{stem}.xlsx"));
    let mut counter = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_{counter}.xlsx"));
        counter += 1;
    }
    candidate
}
