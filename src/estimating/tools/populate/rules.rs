use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::estimating::tools::error::Result;
use crate::estimating::tools::model::RefinedRecord;

/// Ductwork base categories and the breakdown labels their Qty totals feed.
/// Leading spaces are part of the template's label text.
const BASE_CATEGORIES: [(&str, &str); 6] = [
    ("Galvanized Steel", "Input Galvanized Steel"),
    ("Residential Kitchen", "Input Residential Kitchen"),
    ("Commercial Kitchen", "Input Commercial Kitchen"),
    ("Aluminum", "Input Aluminum"),
    ("Flat Oval", " Input Flat Oval"),
    ("316 SS 18 Gauge DX", " (Usually Ignore) Stainless Steel"),
];

/// Duct treatments whose square footage is totalled per base category.
const TREATMENTS: [(&str, &str); 3] = [
    ("Acoustically Lined", "Input Acoustical Lining (SqFt)"),
    ("Insulated", "Input Insulation (SqFt)"),
    ("Fire Wrapped", "Input Fire Wrapped (SqFt)"),
];

/// Which refined total a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Qty,
    SquareFeet,
}

impl Measure {
    pub fn of(self, record: &RefinedRecord) -> f64 {
        match self {
            Measure::Qty => record.total_qty,
            Measure::SquareFeet => record.total_square_feet,
        }
    }
}

/// Copies the first matching record's Qty next to a label, overwriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectRule {
    pub marker: String,
    pub label: String,
    #[serde(default = "default_offset")]
    pub offset: u32,
}

/// Writes each matching record's Qty on the row of its size in the
/// INPUT AREA column, `offset` columns to the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedRule {
    pub marker: String,
    pub offset: u32,
}

/// Adds the total of all matching records to the value next to a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumRule {
    pub marker: String,
    pub label: String,
    pub measure: Measure,
    #[serde(default = "default_offset")]
    pub offset: u32,
}

fn default_offset() -> u32 {
    1
}

/// Complete rule table driving the breakdown mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub direct: Vec<DirectRule>,
    #[serde(default)]
    pub sized: Vec<SizedRule>,
    #[serde(default)]
    pub sums: Vec<SumRule>,
}

impl RuleSet {
    /// Loads a rule table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        let direct = vec![DirectRule {
            marker: "refrigerant".to_string(),
            label: "Input Refrigerant Piping".to_string(),
            offset: 1,
        }];

        let sized = [
            ("condensate drain", 1),
            ("equipment riser & branch piping", 2),
            ("sch 40 blk iron", 3),
        ]
        .into_iter()
        .map(|(marker, offset)| SizedRule {
            marker: marker.to_string(),
            offset,
        })
        .collect();

        let base_sums = BASE_CATEGORIES.iter().map(|(category, label)| SumRule {
            marker: (*category).to_string(),
            label: (*label).to_string(),
            measure: Measure::Qty,
            offset: 1,
        });
        let treatment_sums = TREATMENTS.iter().flat_map(|(treatment, label)| {
            BASE_CATEGORIES.iter().map(move |(category, _)| SumRule {
                marker: format!("{treatment} {category}"),
                label: (*label).to_string(),
                measure: Measure::SquareFeet,
                offset: 1,
            })
        });

        Self {
            direct,
            sized,
            sums: base_sums.chain(treatment_sums).collect(),
        }
    }
}

/// Case-insensitive containment used for matching record names to markers.
pub fn name_matches(name: &str, marker: &str) -> bool {
    name.to_lowercase().contains(&marker.to_lowercase())
}
