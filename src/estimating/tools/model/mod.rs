use std::collections::{BTreeMap, BTreeSet};

use crate::estimating::tools::error::{Result, ToolError};

/// Sheet holding the canonical nine-column line items.
pub const RAW_INPUT_SHEET: &str = "raw input";
/// Sheet holding the (Name, Units) aggregates.
pub const REFINED_SHEET: &str = "Refined values";
/// Pre-authored calculator sheet addressed by label text.
pub const BREAKDOWN_SHEET: &str = "Mechanical Breakdown";

/// Number of fields in every normalised line item.
pub const FIELD_COUNT: usize = 9;
/// Field positions that hold numbers and default to `0` when missing.
pub const NUMERIC_FIELDS: [usize; 5] = [1, 3, 6, 7, 8];

pub const RAW_INPUT_HEADER: [&str; FIELD_COUNT] = [
    "Name",
    "Qty",
    "Units",
    "Square feet",
    "Floor",
    "Manufacturer",
    "Labor",
    "Equipment Total",
    "Counts",
];

pub const REFINED_HEADER: [&str; 4] = ["Name", "Units", "Total Qty", "Total Square feet"];

/// Zero-based `(row, column)` address of a cell.
pub type Position = (u32, u32);

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Value held by a single worksheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula source without the leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// True for blank cells and empty strings.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.is_empty(),
            _ => false,
        }
    }

    /// Renders the cell as plain text; blank cells render as `""`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Formula(formula) => format!("={formula}"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// A named worksheet stored as a sparse position → value map.
///
/// Every position written through [`Sheet::set`] or [`Sheet::append_row`] is
/// remembered until [`Sheet::clear_edits`], so a save only touches the cells
/// a stage actually changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// Marks sheets laid out as a header row followed by records.
    pub tabular: bool,
    cells: BTreeMap<Position, CellValue>,
    edited: BTreeSet<Position>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tabular: false,
            cells: BTreeMap::new(),
            edited: BTreeSet::new(),
        }
    }

    /// Builds a tabular sheet from a header and records.
    pub fn from_table<I>(name: impl Into<String>, header: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let mut sheet = Sheet::new(name);
        sheet.tabular = true;
        sheet.append_row(header.iter().map(|column| CellValue::from(*column)));
        for row in rows {
            sheet.append_row(row);
        }
        sheet
    }

    pub fn get(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY_CELL)
    }

    /// Stores `value` at the given position and returns the value it replaced.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) -> CellValue {
        self.edited.insert((row, col));
        let previous = if matches!(value, CellValue::Empty) {
            self.cells.remove(&(row, col))
        } else {
            self.cells.insert((row, col), value)
        };
        previous.unwrap_or_default()
    }

    /// Writes `values` into the row after the last occupied one.
    ///
    /// Empty strings are stored as text so that placeholder cells keep their
    /// column, while `CellValue::Empty` leaves the cell blank.
    pub fn append_row<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = CellValue>,
    {
        let row = self.row_count();
        let mut occupied = false;
        for (col, value) in values.into_iter().enumerate() {
            if !matches!(value, CellValue::Empty) {
                self.set(row, col as u32, value);
                occupied = true;
            }
        }
        // A row of blanks still occupies its slot.
        if !occupied {
            self.set(row, 0, CellValue::Text(String::new()));
        }
    }

    /// Positions written since the sheet was loaded, in row-major order.
    pub fn edits(&self) -> impl Iterator<Item = Position> + '_ {
        self.edited.iter().copied()
    }

    pub fn is_edited(&self) -> bool {
        !self.edited.is_empty()
    }

    /// Forgets pending edits, e.g. once the sheet matches its stored copy.
    pub fn clear_edits(&mut self) {
        self.edited.clear();
    }

    pub fn row_count(&self) -> u32 {
        self.cells
            .keys()
            .next_back()
            .map(|(row, _)| row + 1)
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> u32 {
        self.cells
            .keys()
            .map(|(_, col)| col + 1)
            .max()
            .unwrap_or(0)
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &CellValue)> {
        self.cells.iter().map(|(position, value)| (*position, value))
    }

    /// Text cells in row-major order.
    pub fn text_cells(&self) -> impl Iterator<Item = (Position, &str)> {
        self.cells
            .iter()
            .filter_map(|(position, value)| value.as_str().map(|text| (*position, text)))
    }

    /// Materialises the sheet as dense rows padded to the widest row.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        let width = self.column_count() as usize;
        let mut rows = vec![vec![CellValue::Empty; width]; self.row_count() as usize];
        for ((row, col), value) in &self.cells {
            rows[*row as usize][*col as usize] = value.clone();
        }
        rows
    }
}

/// In-memory workbook: an ordered list of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sheets: Vec<Sheet>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|sheet| sheet.name == name)
    }

    pub fn require_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheet(name)
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
    }

    pub fn require_sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheet_mut(name)
            .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
    }

    /// Inserts `sheet` at `index` (clamped) or appends it when `index` is
    /// `None`. A sheet with the same name is removed first; returns whether
    /// one was replaced.
    pub fn put_sheet(&mut self, sheet: Sheet, index: Option<usize>) -> bool {
        let existing = self.sheets.iter().position(|other| other.name == sheet.name);
        if let Some(position) = existing {
            self.sheets.remove(position);
        }
        match index {
            Some(index) => {
                let index = index.min(self.sheets.len());
                self.sheets.insert(index, sheet);
            }
            None => self.sheets.push(sheet),
        }
        existing.is_some()
    }
}

/// One normalised estimating line item.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub fields: [CellValue; FIELD_COUNT],
}

impl RawRecord {
    pub fn name(&self) -> &CellValue {
        &self.fields[0]
    }

    pub fn qty(&self) -> &CellValue {
        &self.fields[1]
    }

    pub fn units(&self) -> &CellValue {
        &self.fields[2]
    }

    pub fn square_feet(&self) -> &CellValue {
        &self.fields[3]
    }

    pub fn into_row(self) -> Vec<CellValue> {
        self.fields.into()
    }
}

/// Summed totals for one (Name, Units) group.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedRecord {
    pub name: String,
    pub units: String,
    pub total_qty: f64,
    pub total_square_feet: f64,
}

impl RefinedRecord {
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.name.clone()),
            CellValue::Text(self.units.clone()),
            CellValue::Number(self.total_qty),
            CellValue::Number(self.total_square_feet),
        ]
    }
}
