use estimating_tools::io::csv_read;
use estimating_tools::model::{CellValue, Document, RAW_INPUT_HEADER, RAW_INPUT_SHEET, Sheet};
use estimating_tools::normalize::{self, NormalizeSummary};

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn blank() -> CellValue {
    CellValue::Text(String::new())
}

#[test]
fn missing_values_take_type_placeholders_and_tail_is_blank() {
    let record = normalize::normalize_row(&[text("Duct"), CellValue::Empty, text("LF")]);

    assert_eq!(record.name(), &text("Duct"));
    assert_eq!(record.qty(), &CellValue::Number(0.0));
    assert_eq!(record.units(), &text("LF"));
    for field in &record.fields[3..] {
        assert_eq!(field, &blank());
    }
}

#[test]
fn full_width_row_fills_every_missing_slot() {
    let row = vec![
        text("VAV Box"),
        CellValue::Number(2.0),
        CellValue::Empty,
        text(""),
        CellValue::Empty,
        text("Acme"),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Empty,
    ];
    let record = normalize::normalize_row(&row);

    assert_eq!(
        record.fields.to_vec(),
        vec![
            text("VAV Box"),
            CellValue::Number(2.0),
            text("-"),
            CellValue::Number(0.0),
            text("-"),
            text("Acme"),
            CellValue::Number(0.0),
            CellValue::Number(0.0),
            CellValue::Number(0.0),
        ]
    );
}

#[test]
fn rows_longer_than_nine_values_are_truncated() {
    let row: Vec<CellValue> = (0..12).map(|index| CellValue::Number(index as f64)).collect();
    let record = normalize::normalize_row(&row);

    assert_eq!(record.fields.len(), 9);
    assert_eq!(record.fields[8], CellValue::Number(8.0));
}

#[test]
fn blank_and_nameless_rows_are_dropped_in_order() {
    let rows = vec![
        vec![text("First"), CellValue::Number(1.0)],
        vec![CellValue::Empty, text("")],
        Vec::new(),
        vec![CellValue::Empty, CellValue::Number(4.0)],
        vec![text("Last"), CellValue::Number(5.0)],
    ];

    let (records, summary) = normalize::normalize_rows(&rows);

    let names: Vec<CellValue> = records.iter().map(|record| record.name().clone()).collect();
    assert_eq!(names, vec![text("First"), text("-"), text("Last")]);
    assert_eq!(
        summary,
        NormalizeSummary {
            rows_read: 5,
            rows_written: 3,
            rows_dropped: 2,
        }
    );
    assert!(records.iter().all(|record| !record.name().is_empty()));
}

#[test]
fn normalize_into_replaces_existing_raw_input_sheet() {
    let mut document = Document::new();
    document.put_sheet(Sheet::new("Mechanical Breakdown"), None);
    let mut stale = Sheet::new(RAW_INPUT_SHEET);
    stale.set(0, 0, text("stale"));
    document.put_sheet(stale, Some(0));

    let rows = vec![vec![text("Galvanized Steel 6x6"), CellValue::Number(10.0), text("LF")]];
    let summary = normalize::normalize_into(&mut document, &rows);

    assert_eq!(summary.rows_written, 1);
    assert_eq!(document.sheet_names(), vec!["Mechanical Breakdown", RAW_INPUT_SHEET]);

    let sheet = document.sheet(RAW_INPUT_SHEET).expect("raw input sheet");
    assert!(sheet.tabular);
    let header: Vec<String> = (0..9).map(|col| sheet.get(0, col).to_text()).collect();
    assert_eq!(header, RAW_INPUT_HEADER.map(str::to_string).to_vec());
    assert_eq!(sheet.get(1, 0), &text("Galvanized Steel 6x6"));
    assert_eq!(sheet.get(1, 1), &CellValue::Number(10.0));
    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.rows()[1][2], text("LF"));
    assert_eq!(sheet.rows()[1][3], blank());
}

#[test]
fn csv_reader_accepts_ragged_rows() {
    let source = "Refrigerant Piping,12,LF,0,1,-,0,0,0\n\"Duct, round\",5\nHanger\n";
    let rows = csv_read::read_raw_rows_from(source.as_bytes()).expect("rows read");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 9);
    assert_eq!(rows[0][1], CellValue::Number(12.0));
    assert_eq!(rows[0][5], text("-"));
    assert_eq!(rows[1], vec![text("Duct, round"), CellValue::Number(5.0)]);
    assert_eq!(rows[2], vec![text("Hanger")]);
}

#[test]
fn csv_reader_skips_undecodable_rows() {
    let source: &[u8] = b"Alpha,1\n\xff\xfe,2\nBeta,3\n";
    let rows = csv_read::read_raw_rows_from(source).expect("rows read");

    let names: Vec<String> = rows.iter().map(|row| row[0].to_text()).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[test]
fn csv_blank_fields_become_placeholders() {
    let source = "Flex Duct,,LF,,,,,,\n";
    let rows = csv_read::read_raw_rows_from(source.as_bytes()).expect("rows read");
    let (records, _) = normalize::normalize_rows(&rows);

    assert_eq!(records[0].qty(), &CellValue::Number(0.0));
    assert_eq!(records[0].square_feet(), &CellValue::Number(0.0));
    assert_eq!(records[0].fields[4], text("-"));
    assert_eq!(records[0].fields[8], CellValue::Number(0.0));
}

#[test]
fn csv_text_fields_keep_leading_zeros() {
    let source = "007,5,LF,0,01,00123\n";
    let rows = csv_read::read_raw_rows_from(source.as_bytes()).expect("rows read");

    assert_eq!(
        rows[0],
        vec![
            text("007"),
            CellValue::Number(5.0),
            text("LF"),
            CellValue::Number(0.0),
            text("01"),
            text("00123"),
        ]
    );

    let (records, _) = normalize::normalize_rows(&rows);
    assert_eq!(records[0].name(), &text("007"));
    assert_eq!(records[0].fields[4], text("01"));
}
