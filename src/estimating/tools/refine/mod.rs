//! Groups canonical line items by (Name, Units) and sums their quantities.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::estimating::tools::error::{Result, ToolError};
use crate::estimating::tools::model::{
    CellValue, Document, RAW_INPUT_SHEET, REFINED_HEADER, REFINED_SHEET, RefinedRecord, Sheet,
};

/// Position at which the refined sheet is inserted.
const REFINED_SHEET_INDEX: usize = 1;

const REQUIRED_COLUMNS: [&str; 4] = ["Name", "Qty", "Units", "Square feet"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineSummary {
    pub input_rows: usize,
    pub groups: usize,
}

/// Coerces a cell to a number. Thousands separators are stripped from text;
/// anything that still fails to parse counts as zero.
pub fn coerce_number(value: &CellValue) -> f64 {
    let parsed = match value {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => {
            let cleaned = text.replace(',', "");
            let parsed = cleaned.trim().parse::<f64>().ok();
            if parsed.is_none() {
                debug!(value = %text, "non-numeric text coerced to 0");
            }
            parsed
        }
        CellValue::Bool(_) | CellValue::Formula(_) | CellValue::Empty => None,
    };
    parsed.filter(|number| number.is_finite()).unwrap_or(0.0)
}

/// Resolves each of `names` to its column in the sheet's header row.
pub fn locate_columns<const N: usize>(sheet: &Sheet, names: [&str; N]) -> Result<[u32; N]> {
    let header: Vec<String> = (0..sheet.column_count())
        .map(|col| sheet.get(0, col).to_text())
        .collect();

    let mut columns = [0u32; N];
    for (slot, name) in columns.iter_mut().zip(names) {
        let position = header.iter().position(|candidate| candidate == name);
        *slot = position.ok_or_else(|| ToolError::MissingColumn {
            sheet: sheet.name.clone(),
            column: name.to_string(),
        })? as u32;
    }
    Ok(columns)
}

/// Aggregates the canonical "raw input" sheet into one record per distinct
/// (Name, Units) pair, ordered by that pair.
///
/// Keys compare by exact text; no case folding or trimming is applied.
pub fn refine_sheet(sheet: &Sheet) -> Result<(Vec<RefinedRecord>, RefineSummary)> {
    let [name_col, qty_col, units_col, square_feet_col] = locate_columns(sheet, REQUIRED_COLUMNS)?;

    let mut groups: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    let mut input_rows = 0usize;

    for row in 1..sheet.row_count() {
        let name = sheet.get(row, name_col);
        if name.is_empty() {
            continue;
        }
        input_rows += 1;

        let key = (name.to_text(), sheet.get(row, units_col).to_text());
        let totals = groups.entry(key).or_insert((0.0, 0.0));
        totals.0 += coerce_number(sheet.get(row, qty_col));
        totals.1 += coerce_number(sheet.get(row, square_feet_col));
    }

    let records: Vec<RefinedRecord> = groups
        .into_iter()
        .map(|((name, units), (total_qty, total_square_feet))| RefinedRecord {
            name,
            units,
            total_qty,
            total_square_feet,
        })
        .collect();

    let summary = RefineSummary {
        input_rows,
        groups: records.len(),
    };
    Ok((records, summary))
}

pub fn build_refined_sheet(records: &[RefinedRecord]) -> Sheet {
    Sheet::from_table(
        REFINED_SHEET,
        &REFINED_HEADER,
        records.iter().map(RefinedRecord::to_row),
    )
}

/// Reads previously written aggregates back from the refined sheet.
pub fn read_refined(sheet: &Sheet) -> Result<Vec<RefinedRecord>> {
    let [name_col, units_col, qty_col, square_feet_col] = locate_columns(sheet, REFINED_HEADER)?;

    let records = (1..sheet.row_count())
        .filter(|row| !sheet.get(*row, name_col).is_empty())
        .map(|row| RefinedRecord {
            name: sheet.get(row, name_col).to_text(),
            units: sheet.get(row, units_col).to_text(),
            total_qty: coerce_number(sheet.get(row, qty_col)),
            total_square_feet: coerce_number(sheet.get(row, square_feet_col)),
        })
        .collect();
    Ok(records)
}

/// Rebuilds the "Refined values" sheet from the document's "raw input" sheet.
///
/// Nothing is written when the source sheet or one of its columns is missing.
pub fn refine_document(document: &mut Document) -> Result<RefineSummary> {
    let raw_input = document.require_sheet(RAW_INPUT_SHEET)?;
    let (records, summary) = refine_sheet(raw_input)?;

    if document.put_sheet(build_refined_sheet(&records), Some(REFINED_SHEET_INDEX)) {
        warn!(sheet = REFINED_SHEET, "sheet already existed and was overwritten");
    }
    info!(
        input_rows = summary.input_rows,
        groups = summary.groups,
        "refined raw input"
    );
    Ok(summary)
}
