use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::estimating::tools::error::Result;
use crate::estimating::tools::model::{CellValue, NUMERIC_FIELDS};

/// Reads a delimited file whose rows may carry any number of fields.
pub fn read_raw_rows(path: &Path) -> Result<Vec<Vec<CellValue>>> {
    let file = File::open(path)?;
    read_raw_rows_from(file)
}

/// Reads ragged rows from any reader. Rows that cannot be decoded are logged
/// and skipped; I/O failures abort the read.
pub fn read_raw_rows_from<R: Read>(source: R) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(
                record
                    .iter()
                    .enumerate()
                    .map(|(slot, field)| parse_field(slot, field))
                    .collect(),
            ),
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                skipped += 1;
                warn!(line = index + 1, %error, "skipping malformed row");
            }
        }
    }

    debug!(rows = rows.len(), skipped, "read delimited input");
    Ok(rows)
}

/// Only the numeric slots are read as numbers; every other field keeps its
/// text, so names like `007` and floors like `01` survive unchanged.
fn parse_field(slot: usize, field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if !NUMERIC_FIELDS.contains(&slot) {
        return CellValue::Text(field.to_string());
    }
    match field.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Text(field.to_string()),
    }
}
