use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::estimating::tools::error::{Result, ToolError};
use crate::estimating::tools::model::{CellValue, Document, RAW_INPUT_SHEET, REFINED_SHEET, Sheet};

/// Sheets written as header + records tables by the pipeline.
const TABULAR_SHEETS: [&str; 2] = [RAW_INPUT_SHEET, REFINED_SHEET];

/// Loads every sheet of an Excel workbook, in workbook order, into memory.
///
/// Cached values are read first and formulas are laid over them, so a
/// template's formulas survive a load/save cycle.
pub fn read_document(path: &Path) -> Result<Document> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let mut document = Document::new();

    for name in workbook.sheet_names().to_vec() {
        let range = read_required_sheet(&mut workbook, &name)?;
        let mut sheet = Sheet::new(name.clone());
        load_values(&mut sheet, &range);

        if let Some(formulas) = workbook.worksheet_formula(&name) {
            load_formulas(&mut sheet, &formulas?);
        }

        sheet.tabular = TABULAR_SHEETS.contains(&name.as_str());
        sheet.clear_edits();
        document.put_sheet(sheet, None);
    }

    Ok(document)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn load_values(sheet: &mut Sheet, range: &calamine::Range<DataType>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };
    for (row_idx, row) in range.rows().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let value = cell_to_value(cell);
            if matches!(value, CellValue::Empty) {
                continue;
            }
            sheet.set(start_row + row_idx as u32, start_col + col_idx as u32, value);
        }
    }
}

fn load_formulas(sheet: &mut Sheet, range: &calamine::Range<String>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };
    for (row_idx, row) in range.rows().enumerate() {
        for (col_idx, formula) in row.iter().enumerate() {
            if formula.is_empty() {
                continue;
            }
            let formula = formula.strip_prefix('=').unwrap_or(formula);
            sheet.set(
                start_row + row_idx as u32,
                start_col + col_idx as u32,
                CellValue::Formula(formula.to_string()),
            );
        }
    }
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(value) => CellValue::Number(*value),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}
