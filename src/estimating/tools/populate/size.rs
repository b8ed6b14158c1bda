use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::estimating::tools::model::{Position, Sheet};

const INPUT_AREA_MARKER: &str = "INPUT AREA";

fn size_pattern() -> &'static Regex {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    // Alternation order is the match priority.
    SIZE_RE.get_or_init(|| Regex::new(r"\d+-\d+/\d+|\d+/\d+|\d+-\d+|\d+").expect("valid regex"))
}

/// Extracts the nominal size from a record name, e.g. `1-1/2"` from
/// `Condensate Drain 1-1/2"`.
///
/// The size is the last size-shaped token in the name, so that designations
/// such as `SCH 40` ahead of it are passed over. A trailing `"` is appended
/// when missing.
pub fn extract_size_token(name: &str) -> Option<String> {
    let token = size_pattern().find_iter(name).last()?.as_str().trim();
    if token.contains('"') {
        Some(token.to_string())
    } else {
        Some(format!("{token}\""))
    }
}

/// Finds the INPUT AREA marker, scanning row by row.
pub fn find_input_area(sheet: &Sheet) -> Option<Position> {
    sheet
        .text_cells()
        .find(|(_, text)| text.trim().to_uppercase() == INPUT_AREA_MARKER)
        .map(|(position, _)| position)
}

/// Size labels of the INPUT AREA column mapped to the rows they sit on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeIndex {
    pub column: u32,
    rows: HashMap<String, u32>,
}

impl SizeIndex {
    /// Indexes the trimmed text cells of `column`; when a size repeats, the
    /// last row carrying it wins.
    pub fn build(sheet: &Sheet, column: u32) -> Self {
        let mut rows = HashMap::new();
        for ((row, col), text) in sheet.text_cells() {
            if col == column {
                rows.insert(text.trim().to_string(), row);
            }
        }
        Self { column, rows }
    }

    pub fn row_of(&self, size: &str) -> Option<u32> {
        self.rows.get(size).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
