use std::fs;
use std::path::Path;

use estimating_tools::ToolError;
use estimating_tools::io::excel_read;
use estimating_tools::model::{BREAKDOWN_SHEET, CellValue, RAW_INPUT_SHEET, REFINED_SHEET};
use estimating_tools::pipeline;
use estimating_tools::populate::RuleSet;
use estimating_tools::refine;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::tempdir;

const RAW_EXPORT: &str = "\
Refrigerant Piping,12,LF,0,1,-,0,0,0
Galvanized Steel 6x6,10,LF,40,2,-,0,0,0
Galvanized Steel 6x6,5,LF,20,2
Condensate Drain 3/4,\"1,200\",LF
";

fn write_template(path: &Path, with_input_area: bool) {
    let mut workbook = Workbook::new();
    let title = Format::new().set_bold();

    let cover = workbook.add_worksheet();
    cover.set_name("Cover").expect("cover named");
    cover.write_string(0, 0, "Project").expect("cover title");

    let breakdown = workbook.add_worksheet();
    breakdown.set_name(BREAKDOWN_SHEET).expect("breakdown named");
    breakdown
        .merge_range(0, 0, 0, 5, "Mechanical Breakdown", &title)
        .expect("title merged");
    breakdown.set_column_width(2, 40).expect("label column width");
    if with_input_area {
        breakdown.write_string(1, 6, "INPUT AREA").expect("marker");
    }
    breakdown.write_string(2, 6, "1/2\"").expect("size");
    breakdown.write_string(3, 6, "3/4\"").expect("size");
    breakdown
        .write_string(5, 2, "Input Refrigerant Piping")
        .expect("label");
    breakdown.write_number(5, 3, 3.0).expect("prior value");
    breakdown
        .write_string(8, 2, "Input Galvanized Steel")
        .expect("label");
    breakdown.write_number(8, 3, 100.0).expect("prior value");
    breakdown.write_formula(9, 3, "D6+D9").expect("formula");

    workbook.save(path).expect("template written");
}

fn breakdown_value(path: &Path, row: u32, col: u32) -> CellValue {
    let document = excel_read::read_document(path).expect("workbook read");
    document
        .sheet(BREAKDOWN_SHEET)
        .expect("breakdown sheet")
        .get(row, col)
        .clone()
}

#[test]
fn pipeline_fills_breakdown_from_raw_export() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.csv");
    let template = temp_dir.path().join("template.xlsx");
    let output = temp_dir.path().join("M Breakdown.xlsx");
    fs::write(&input, RAW_EXPORT).expect("export written");
    write_template(&template, true);

    let normalized = pipeline::normalize(&input, &template, &output).expect("normalized");
    assert_eq!(normalized.rows_written, 4);

    let refined = pipeline::aggregate(&output).expect("aggregated");
    assert_eq!(refined.groups, 3);

    let document = excel_read::read_document(&output).expect("workbook read");
    assert_eq!(
        document.sheet_names(),
        vec!["Cover", REFINED_SHEET, BREAKDOWN_SHEET, RAW_INPUT_SHEET]
    );
    let records = refine::read_refined(document.sheet(REFINED_SHEET).expect("refined sheet"))
        .expect("refined records");
    let galvanized = records
        .iter()
        .find(|record| record.name == "Galvanized Steel 6x6")
        .expect("galvanized group");
    assert_eq!(galvanized.total_qty, 15.0);
    assert_eq!(galvanized.total_square_feet, 60.0);

    let report = pipeline::map_breakdown(&output, &RuleSet::default()).expect("mapped");
    assert!(!report.writes.is_empty());

    assert_eq!(breakdown_value(&output, 5, 3), CellValue::Number(12.0));
    assert_eq!(breakdown_value(&output, 8, 3), CellValue::Number(115.0));
    assert_eq!(breakdown_value(&output, 3, 7), CellValue::Number(1200.0));
    assert_eq!(
        breakdown_value(&output, 9, 3),
        CellValue::Formula("D6+D9".to_string())
    );
}

#[test]
fn mapping_twice_doubles_ductwork_but_not_piping() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.csv");
    let template = temp_dir.path().join("template.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    fs::write(&input, RAW_EXPORT).expect("export written");
    write_template(&template, true);

    let rules = RuleSet::default();
    pipeline::run(&input, &template, &output, &rules).expect("first run");
    pipeline::map_breakdown(&output, &rules).expect("second mapping");

    assert_eq!(breakdown_value(&output, 5, 3), CellValue::Number(12.0));
    assert_eq!(breakdown_value(&output, 8, 3), CellValue::Number(130.0));
}

#[test]
fn missing_input_area_still_saves_ductwork() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.csv");
    let template = temp_dir.path().join("template.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    fs::write(&input, RAW_EXPORT).expect("export written");
    write_template(&template, false);

    pipeline::normalize(&input, &template, &output).expect("normalized");
    pipeline::aggregate(&output).expect("aggregated");
    let error = pipeline::map_breakdown(&output, &RuleSet::default())
        .expect_err("piping needs INPUT AREA");

    assert!(matches!(error, ToolError::MissingInputArea(_)));
    assert_eq!(breakdown_value(&output, 5, 3), CellValue::Number(3.0));
    assert_eq!(breakdown_value(&output, 8, 3), CellValue::Number(115.0));
}

#[test]
fn aggregate_requires_raw_input_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let workbook = temp_dir.path().join("template.xlsx");
    write_template(&workbook, true);

    let error = pipeline::aggregate(&workbook).expect_err("no raw input sheet");
    assert!(matches!(error, ToolError::MissingSheet(name) if name == RAW_INPUT_SHEET));

    let document = excel_read::read_document(&workbook).expect("workbook read");
    assert!(document.sheet(REFINED_SHEET).is_none());
}

#[test]
fn template_layout_survives_every_stage() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.csv");
    let template = temp_dir.path().join("template.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    fs::write(&input, RAW_EXPORT).expect("export written");
    write_template(&template, true);

    pipeline::normalize(&input, &template, &output).expect("normalized");
    let book = umya_spreadsheet::reader::xlsx::read(&output).expect("output opened");
    let sheet = book
        .get_sheet_by_name(BREAKDOWN_SHEET)
        .expect("breakdown sheet");
    assert_eq!(sheet.get_merge_cells().len(), 1);
    assert_eq!(sheet.get_value((1, 1)), "Mechanical Breakdown");

    pipeline::aggregate(&output).expect("aggregated");
    pipeline::map_breakdown(&output, &RuleSet::default()).expect("mapped");
    let book = umya_spreadsheet::reader::xlsx::read(&output).expect("output opened");
    let sheet = book
        .get_sheet_by_name(BREAKDOWN_SHEET)
        .expect("breakdown sheet");
    assert_eq!(sheet.get_merge_cells().len(), 1);
    assert_eq!(breakdown_value(&output, 8, 3), CellValue::Number(115.0));
}

#[test]
fn leading_zero_text_reaches_the_workbook_unchanged() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("input.csv");
    let template = temp_dir.path().join("template.xlsx");
    let output = temp_dir.path().join("output.xlsx");
    fs::write(&input, "007,5,LF,0,01,00123\n7,2,LF\n").expect("export written");
    write_template(&template, true);

    pipeline::normalize(&input, &template, &output).expect("normalized");
    let summary = pipeline::aggregate(&output).expect("aggregated");
    assert_eq!(summary.groups, 2);

    let document = excel_read::read_document(&output).expect("workbook read");
    let raw = document.sheet(RAW_INPUT_SHEET).expect("raw input sheet");
    assert_eq!(raw.get(1, 0), &CellValue::text("007"));
    assert_eq!(raw.get(1, 4), &CellValue::text("01"));
    assert_eq!(raw.get(1, 5), &CellValue::text("00123"));
}
