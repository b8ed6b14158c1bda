use std::path::Path;

use tracing::{info, instrument, warn};

use crate::estimating::tools::error::Result;
use crate::estimating::tools::io::{csv_read, excel_read, excel_write};
use crate::estimating::tools::normalize::{self, NormalizeSummary};
use crate::estimating::tools::populate::{self, PopulateReport, RuleSet};
use crate::estimating::tools::refine::{self, RefineSummary};

/// Normalises a delimited export into the "raw input" sheet of a copy of the
/// template written to `output`. Everything else in the template is kept.
#[instrument(
    level = "info",
    skip_all,
    fields(
        input = %input.display(),
        template = %template.display(),
        output = %output.display()
    )
)]
pub fn normalize(input: &Path, template: &Path, output: &Path) -> Result<NormalizeSummary> {
    let mut document = excel_read::read_document(template)?;
    info!(sheets = ?document.sheet_names(), "loaded template");
    let rows = csv_read::read_raw_rows(input)?;
    let summary = normalize::normalize_into(&mut document, &rows);
    excel_write::save_document(template, output, &document)?;
    Ok(summary)
}

/// Rebuilds the "Refined values" sheet of the workbook at `workbook`.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display()))]
pub fn aggregate(workbook: &Path) -> Result<RefineSummary> {
    let mut document = excel_read::read_document(workbook)?;
    let summary = refine::refine_document(&mut document)?;
    excel_write::save_document(workbook, workbook, &document)?;
    Ok(summary)
}

/// Populates the breakdown sheet of the workbook at `workbook`.
///
/// The ductwork section is filled and saved even when the piping section
/// cannot be, in which case the piping error is returned afterwards.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display()))]
pub fn map_breakdown(workbook: &Path, rules: &RuleSet) -> Result<PopulateReport> {
    let mut document = excel_read::read_document(workbook)?;

    let piping = populate::populate_piping(&mut document, rules);
    if let Err(error) = &piping {
        warn!(%error, "piping section not populated");
    }
    let ductwork = populate::populate_ductwork(&mut document, rules)?;
    excel_write::save_document(workbook, workbook, &document)?;

    let mut report = piping?;
    report.merge(ductwork);
    Ok(report)
}

/// Runs normalisation, aggregation and mapping in order against `output`.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn run(input: &Path, template: &Path, output: &Path, rules: &RuleSet) -> Result<PopulateReport> {
    normalize(input, template, output)?;
    aggregate(output)?;
    map_breakdown(output, rules)
}
