use std::fmt::Display;
use std::path::Path;

use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::estimating::tools::error::{Result, ToolError};
use crate::estimating::tools::model::{CellValue, Document, Position, Sheet};

/// Saves `document` to `target` as an edit of the workbook stored at `base`.
///
/// The base workbook is opened as-is, so merged ranges, column widths and
/// cell styles of everything the pipeline does not touch are kept. Sheets
/// are then laid out in document order:
/// - a sheet missing from the base is created with all of its cells;
/// - an edited tabular sheet is dropped and rebuilt from scratch;
/// - any other sheet only receives the cells edited since it was loaded.
///
/// `base` and `target` may be the same path.
pub fn save_document(base: &Path, target: &Path, document: &Document) -> Result<()> {
    let mut book = umya_spreadsheet::reader::xlsx::read(base).map_err(workbook_error)?;

    for (index, sheet) in document.sheets().iter().enumerate() {
        apply_sheet(&mut book, sheet)?;
        move_sheet(&mut book, &sheet.name, index);
    }

    umya_spreadsheet::writer::xlsx::write(&book, target).map_err(workbook_error)?;
    Ok(())
}

fn apply_sheet(book: &mut Spreadsheet, sheet: &Sheet) -> Result<()> {
    let exists = book.get_sheet_by_name(&sheet.name).is_some();
    if exists && !sheet.is_edited() {
        return Ok(());
    }

    let rebuild = !exists || sheet.tabular;
    if exists && rebuild {
        book.remove_sheet_by_name(&sheet.name).map_err(workbook_error)?;
    }
    if rebuild {
        book.new_sheet(&sheet.name).map_err(workbook_error)?;
    }
    let worksheet = book
        .get_sheet_by_name_mut(&sheet.name)
        .ok_or_else(|| ToolError::MissingSheet(sheet.name.clone()))?;

    if rebuild {
        for (position, value) in sheet.cells() {
            // Excel has no empty string cells; the slot stays blank.
            if !value.is_empty() {
                write_cell(worksheet, position, value);
            }
        }
        if sheet.tabular && sheet.row_count() >= 2 {
            add_filter(worksheet, sheet);
        }
        debug!(sheet = %sheet.name, cells = sheet.cells().count(), "rebuilt sheet");
    } else {
        let mut written = 0usize;
        for position in sheet.edits() {
            write_cell(worksheet, position, sheet.get(position.0, position.1));
            written += 1;
        }
        debug!(sheet = %sheet.name, cells = written, "updated sheet in place");
    }
    Ok(())
}

/// Writes one value; the cell keeps whatever style the base workbook gave it.
fn write_cell(worksheet: &mut Worksheet, (row, col): Position, value: &CellValue) {
    let cell = worksheet.get_cell_mut((col + 1, row + 1));
    match value {
        CellValue::Empty => {
            cell.set_value_string("");
        }
        CellValue::Text(text) => {
            cell.set_value_string(text.as_str());
        }
        CellValue::Number(number) => {
            cell.set_value_number(*number);
        }
        CellValue::Bool(flag) => {
            cell.set_value_bool(*flag);
        }
        CellValue::Formula(formula) => {
            cell.set_formula(formula.as_str());
        }
    }
}

/// Puts an autofilter over a header + records sheet.
fn add_filter(worksheet: &mut Worksheet, sheet: &Sheet) {
    let last_column = column_name(sheet.column_count());
    worksheet.set_auto_filter(format!("A1:{last_column}{}", sheet.row_count()));
}

/// Moves the named sheet to `index` without disturbing the others' order.
fn move_sheet(book: &mut Spreadsheet, name: &str, index: usize) {
    let sheets = book.get_sheet_collection_mut();
    let Some(current) = sheets.iter().position(|sheet| sheet.get_name() == name) else {
        return;
    };
    if current > index {
        sheets[index..=current].rotate_right(1);
    } else if current < index && index < sheets.len() {
        sheets[current..=index].rotate_left(1);
    }
}

/// Spreadsheet column letters for a one-based column number.
fn column_name(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        let rem = (number - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        number = (number - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn workbook_error(error: impl Display) -> ToolError {
    ToolError::Workbook(error.to_string())
}
