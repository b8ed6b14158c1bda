//! Normalises ragged estimating rows into the fixed nine-field schema.

use tracing::{debug, info, warn};

use crate::estimating::tools::model::{
    CellValue, Document, NUMERIC_FIELDS, RAW_INPUT_HEADER, RAW_INPUT_SHEET, RawRecord, Sheet,
};

/// Counts collected while normalising a batch of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
}

/// Normalises a single source row, keeping at most its first nine values.
///
/// Missing values inside the row become `0` in numeric slots and `-`
/// elsewhere; positions past the end of the row are padded with empty text.
pub fn normalize_row(values: &[CellValue]) -> RawRecord {
    let fields = std::array::from_fn(|index| match values.get(index) {
        Some(value) if !value.is_empty() => value.clone(),
        Some(_) => placeholder(index),
        None => CellValue::Text(String::new()),
    });
    RawRecord { fields }
}

fn placeholder(index: usize) -> CellValue {
    if NUMERIC_FIELDS.contains(&index) {
        CellValue::Number(0.0)
    } else {
        CellValue::text("-")
    }
}

/// Normalises every row, dropping blank rows and rows without a name.
/// Surviving records keep their input order.
pub fn normalize_rows(rows: &[Vec<CellValue>]) -> (Vec<RawRecord>, NormalizeSummary) {
    let mut summary = NormalizeSummary {
        rows_read: rows.len(),
        ..NormalizeSummary::default()
    };

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if row.iter().all(CellValue::is_empty) {
            debug!(row = index + 1, "dropping blank row");
            summary.rows_dropped += 1;
            continue;
        }

        let record = normalize_row(row);
        if record.name().is_empty() {
            debug!(row = index + 1, "dropping row without a name");
            summary.rows_dropped += 1;
            continue;
        }
        records.push(record);
    }

    summary.rows_written = records.len();
    (records, summary)
}

pub fn build_raw_input_sheet(records: Vec<RawRecord>) -> Sheet {
    Sheet::from_table(
        RAW_INPUT_SHEET,
        &RAW_INPUT_HEADER,
        records.into_iter().map(RawRecord::into_row),
    )
}

/// Normalises `rows` and stores them as the document's "raw input" sheet,
/// replacing any previous one.
pub fn normalize_into(document: &mut Document, rows: &[Vec<CellValue>]) -> NormalizeSummary {
    let (records, summary) = normalize_rows(rows);
    if document.put_sheet(build_raw_input_sheet(records), None) {
        warn!(sheet = RAW_INPUT_SHEET, "sheet already existed and was overwritten");
    }
    info!(
        rows_read = summary.rows_read,
        rows_written = summary.rows_written,
        rows_dropped = summary.rows_dropped,
        "normalised raw rows"
    );
    summary
}
