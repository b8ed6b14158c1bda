//! Transfers refined totals into the label-addressed breakdown sheet.
//!
//! Piping rules (direct and size-keyed lookups) overwrite their target cells
//! and need the INPUT AREA marker. Ductwork rules (category and treatment
//! sums) add onto whatever number already sits in the target cell, so
//! running them twice doubles the totals.

pub mod rules;
pub mod size;

use tracing::{debug, info, warn};

use crate::estimating::tools::error::{Result, ToolError};
use crate::estimating::tools::model::{
    BREAKDOWN_SHEET, CellValue, Document, Position, REFINED_SHEET, RefinedRecord, Sheet,
};
use crate::estimating::tools::refine::read_refined;

pub use rules::{DirectRule, Measure, RuleSet, SizedRule, SumRule};
pub use size::{SizeIndex, extract_size_token, find_input_area};

/// A single value placed into the breakdown sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub row: u32,
    pub col: u32,
    pub previous: CellValue,
    pub value: f64,
}

/// A rule input that could not be placed; the target is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No refined record name contains the marker.
    Record { marker: String },
    /// No breakdown cell contains the label.
    Label { label: String },
    /// The record name carries no size token.
    NoSize { name: String },
    /// The size token is not listed in the INPUT AREA column.
    UnknownSize { name: String, size: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateReport {
    pub writes: Vec<CellWrite>,
    pub unresolved: Vec<Unresolved>,
}

impl PopulateReport {
    pub fn merge(&mut self, other: PopulateReport) {
        self.writes.extend(other.writes);
        self.unresolved.extend(other.unresolved);
    }

    fn overwrite(&mut self, sheet: &mut Sheet, (row, col): Position, value: f64) {
        let previous = sheet.set(row, col, CellValue::Number(value));
        self.writes.push(CellWrite {
            row,
            col,
            previous,
            value,
        });
    }

    fn accumulate(&mut self, sheet: &mut Sheet, (row, col): Position, amount: f64) {
        let existing = sheet.get(row, col).as_number().unwrap_or(0.0);
        self.overwrite(sheet, (row, col), existing + amount);
    }

    fn skip(&mut self, entry: Unresolved) {
        warn!(?entry, "breakdown input left unset");
        self.unresolved.push(entry);
    }
}

/// Text cells of the breakdown sheet, captured once per pass.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    labels: Vec<(Position, String)>,
}

impl LabelIndex {
    pub fn build(sheet: &Sheet) -> Self {
        let labels = sheet
            .text_cells()
            .map(|(position, text)| (position, text.to_string()))
            .collect();
        Self { labels }
    }

    /// Cells whose text contains `label` (case-sensitive), taking only the
    /// first such cell on each row.
    pub fn find(&self, label: &str) -> Vec<Position> {
        let mut found: Vec<Position> = Vec::new();
        for (position, text) in &self.labels {
            if found.last().is_some_and(|(row, _)| *row == position.0) {
                continue;
            }
            if text.contains(label) {
                found.push(*position);
            }
        }
        found
    }
}

/// Fills the refrigerant and size-keyed piping inputs.
///
/// Fails without touching the breakdown sheet when either sheet or the
/// INPUT AREA marker is missing.
pub fn populate_piping(document: &mut Document, rules: &RuleSet) -> Result<PopulateReport> {
    let records = read_refined(document.require_sheet(REFINED_SHEET)?)?;
    let sheet = document.require_sheet_mut(BREAKDOWN_SHEET)?;

    let (marker_row, input_column) = find_input_area(sheet)
        .ok_or_else(|| ToolError::MissingInputArea(BREAKDOWN_SHEET.to_string()))?;
    debug!(row = marker_row, column = input_column, "located INPUT AREA");

    let labels = LabelIndex::build(sheet);
    let sizes = SizeIndex::build(sheet, input_column);
    debug!(sizes = sizes.len(), "indexed size column");
    let mut report = PopulateReport::default();

    for rule in &rules.direct {
        apply_direct(sheet, &labels, &records, rule, &mut report);
    }
    for rule in &rules.sized {
        apply_sized(sheet, &sizes, &records, rule, &mut report);
    }

    info!(
        writes = report.writes.len(),
        unresolved = report.unresolved.len(),
        "piping section populated"
    );
    Ok(report)
}

/// Adds category and treatment totals to the ductwork inputs.
pub fn populate_ductwork(document: &mut Document, rules: &RuleSet) -> Result<PopulateReport> {
    let records = read_refined(document.require_sheet(REFINED_SHEET)?)?;
    let sheet = document.require_sheet_mut(BREAKDOWN_SHEET)?;

    let labels = LabelIndex::build(sheet);
    let mut report = PopulateReport::default();

    for rule in &rules.sums {
        apply_sum(sheet, &labels, &records, rule, &mut report);
    }

    info!(
        writes = report.writes.len(),
        unresolved = report.unresolved.len(),
        "ductwork section populated"
    );
    Ok(report)
}

fn apply_direct(
    sheet: &mut Sheet,
    labels: &LabelIndex,
    records: &[RefinedRecord],
    rule: &DirectRule,
    report: &mut PopulateReport,
) {
    let Some(record) = records
        .iter()
        .find(|record| rules::name_matches(&record.name, &rule.marker))
    else {
        report.skip(Unresolved::Record {
            marker: rule.marker.clone(),
        });
        return;
    };

    let targets = labels.find(&rule.label);
    if targets.is_empty() {
        report.skip(Unresolved::Label {
            label: rule.label.clone(),
        });
        return;
    }
    for (row, col) in targets {
        report.overwrite(sheet, (row, col + rule.offset), record.total_qty);
        debug!(label = %rule.label, row, value = record.total_qty, "placed direct value");
    }
}

fn apply_sized(
    sheet: &mut Sheet,
    sizes: &SizeIndex,
    records: &[RefinedRecord],
    rule: &SizedRule,
    report: &mut PopulateReport,
) {
    let matching = records
        .iter()
        .filter(|record| rules::name_matches(&record.name, &rule.marker));

    for record in matching {
        let Some(size) = extract_size_token(&record.name) else {
            report.skip(Unresolved::NoSize {
                name: record.name.clone(),
            });
            continue;
        };
        let Some(row) = sizes.row_of(&size) else {
            report.skip(Unresolved::UnknownSize {
                name: record.name.clone(),
                size,
            });
            continue;
        };
        let col = sizes.column + rule.offset;
        report.overwrite(sheet, (row, col), record.total_qty);
        debug!(marker = %rule.marker, %size, row, col, "placed sized value");
    }
}

fn apply_sum(
    sheet: &mut Sheet,
    labels: &LabelIndex,
    records: &[RefinedRecord],
    rule: &SumRule,
    report: &mut PopulateReport,
) {
    let total: f64 = records
        .iter()
        .filter(|record| rules::name_matches(&record.name, &rule.marker))
        .map(|record| rule.measure.of(record))
        .sum();

    let targets = labels.find(&rule.label);
    if targets.is_empty() {
        report.skip(Unresolved::Label {
            label: rule.label.clone(),
        });
        return;
    }
    for (row, col) in targets {
        report.accumulate(sheet, (row, col + rule.offset), total);
        debug!(marker = %rule.marker, label = %rule.label, total, "accumulated total");
    }
}
