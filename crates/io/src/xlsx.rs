// Excel import (xlsx, xls) and partition workbook export

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};

use payrecon_recon::{Cell, MatchResult, ReconError, Table};

use crate::csv::number_cell;
use crate::loader::header_names;

pub const MATCHED_SHEET: &str = "Matched";
pub const UNMATCHED_LEFT_SHEET: &str = "Non_Matching_File1";
pub const UNMATCHED_RIGHT_SHEET: &str = "Non_Matching_File2";

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Import the first worksheet of an Excel file.
pub fn import(path: &Path) -> Result<Table, ReconError> {
    let display = path.display().to_string();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReconError::load(&display, format!("failed to open Excel file: {e}")))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReconError::load(&display, "Excel file contains no sheets"))?;

    read_sheet(&mut workbook, &display, &first)
}

/// Read every worksheet of an in-memory workbook, in sheet order.
pub fn sheets_from_bytes(bytes: &[u8]) -> Result<Vec<(String, Table)>, ReconError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ReconError::load("<workbook>", e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let table = read_sheet(&mut workbook, &name, &name)?;
        sheets.push((name, table));
    }
    Ok(sheets)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    table_name: &str,
    sheet_name: &str,
) -> Result<Table, ReconError> {
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| ReconError::load(table_name, format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
        None => return Err(ReconError::load(table_name, "no columns to parse from file")),
    };
    let columns = header_names(header);

    let rows: Vec<Vec<Cell>> = rows
        .map(|cells| cells.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    Table::new(table_name, columns, rows)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(n) => number_cell(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => number_cell(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::DateTime)
            .unwrap_or_else(|_| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the three partitions to an in-memory workbook.
///
/// Each sheet keeps its own header: the matched sheet has the joined
/// columns, the unmatched sheets have only their source table's columns.
pub fn write_workbook(result: &MatchResult) -> Result<Vec<u8>, ReconError> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let sheets = [
        (MATCHED_SHEET, &result.matched),
        (UNMATCHED_LEFT_SHEET, &result.unmatched_left),
        (UNMATCHED_RIGHT_SHEET, &result.unmatched_right),
    ];

    for (name, table) in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| render_err(&format!("failed to create sheet '{name}'"), e))?;
        write_table(worksheet, name, table, &header_format, &datetime_format)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| render_err("failed to serialize workbook", e))
}

fn render_err(context: &str, e: XlsxError) -> ReconError {
    ReconError::Render(format!("{context}: {e}"))
}

/// Worksheet coordinates for a zero-based (row, col), or `Render` when
/// they do not fit the writer's index types.
fn position(sheet: &str, row: usize, col: usize) -> Result<(u32, u16), ReconError> {
    let r = u32::try_from(row)
        .map_err(|_| ReconError::Render(format!("sheet '{sheet}': row {row} out of range")))?;
    let c = u16::try_from(col)
        .map_err(|_| ReconError::Render(format!("sheet '{sheet}': column {col} out of range")))?;
    Ok((r, c))
}

fn write_table(
    worksheet: &mut Worksheet,
    sheet: &str,
    table: &Table,
    header_format: &Format,
    datetime_format: &Format,
) -> Result<(), ReconError> {
    let write_err = |e: XlsxError| render_err(&format!("failed to write sheet '{sheet}'"), e);

    for (col, name) in table.columns().iter().enumerate() {
        let (row, col) = position(sheet, 0, col)?;
        worksheet
            .write_string_with_format(row, col, name, header_format)
            .map_err(write_err)?;
    }

    for (row_idx, cells) in table.rows().iter().enumerate() {
        for (col_idx, cell) in cells.iter().enumerate() {
            let (row, col) = position(sheet, row_idx + 1, col_idx)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s).map_err(write_err)?;
                }
                Cell::Int(n) => {
                    // Beyond 15 significant digits Excel would round; keep the digits as text
                    if exceeds_excel_precision(*n) {
                        worksheet.write_string(row, col, n.to_string()).map_err(write_err)?;
                    } else {
                        worksheet.write_number(row, col, *n as f64).map_err(write_err)?;
                    }
                }
                Cell::Float(n) => {
                    worksheet.write_number(row, col, n.0).map_err(write_err)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row, col, *b).map_err(write_err)?;
                }
                Cell::DateTime(dt) => match excel_serial(dt) {
                    Some(serial) => {
                        worksheet
                            .write_number_with_format(row, col, serial, datetime_format)
                            .map_err(write_err)?;
                    }
                    None => {
                        worksheet.write_string(row, col, cell.to_string()).map_err(write_err)?;
                    }
                },
            }
        }
    }

    worksheet.autofit();
    Ok(())
}

fn exceeds_excel_precision(n: i64) -> bool {
    n.unsigned_abs() >= 1_000_000_000_000_000
}

/// Excel serial date (1900 system) for a date-time.
fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    Some((*dt - epoch).num_milliseconds() as f64 / 86_400_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(name, columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    fn sample_result() -> MatchResult {
        MatchResult {
            matched: table(
                "Matched",
                &["utr no", "amount_x", "utr", "amount_y"],
                vec![
                    vec![Cell::text("A2"), Cell::Int(10), Cell::text("A2"), Cell::float(10.5)],
                    vec![Cell::text("A2"), Cell::Empty, Cell::text("A2"), Cell::Int(3)],
                ],
            ),
            unmatched_left: table(
                "cis",
                &["utr no", "amount"],
                vec![vec![Cell::text("A1"), Cell::Int(7)]],
            ),
            unmatched_right: table("tp", &["utr", "amount", "ok"], vec![]),
        }
    }

    #[test]
    fn three_named_sheets_in_order() {
        let bytes = write_workbook(&sample_result()).unwrap();
        let sheets = sheets_from_bytes(&bytes).unwrap();
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Matched", "Non_Matching_File1", "Non_Matching_File2"]);
    }

    #[test]
    fn round_trip_keeps_columns_and_counts() {
        let result = sample_result();
        let bytes = write_workbook(&result).unwrap();
        let sheets = sheets_from_bytes(&bytes).unwrap();

        let expected = [&result.matched, &result.unmatched_left, &result.unmatched_right];
        for ((name, read), original) in sheets.iter().zip(expected) {
            assert_eq!(read.columns(), original.columns(), "sheet {name}");
            assert_eq!(read.len(), original.len(), "sheet {name}");
        }
    }

    #[test]
    fn round_trip_keeps_typed_values() {
        let bytes = write_workbook(&sample_result()).unwrap();
        let sheets = sheets_from_bytes(&bytes).unwrap();
        let matched = &sheets[0].1;
        assert_eq!(matched.get(0, "utr no"), Some(&Cell::text("A2")));
        assert_eq!(matched.get(0, "amount_x"), Some(&Cell::Int(10)));
        assert_eq!(matched.get(0, "amount_y"), Some(&Cell::float(10.5)));
        assert_eq!(matched.get(1, "amount_x"), Some(&Cell::Empty));
    }

    #[test]
    fn long_integers_stay_exact() {
        let result = MatchResult {
            matched: table("Matched", &["utr no"], vec![]),
            unmatched_left: table(
                "cis",
                &["utr no"],
                vec![vec![Cell::Int(123_456_789_012_345_678)]],
            ),
            unmatched_right: table("tp", &["utr"], vec![]),
        };
        let bytes = write_workbook(&result).unwrap();
        let sheets = sheets_from_bytes(&bytes).unwrap();
        assert_eq!(
            sheets[1].1.get(0, "utr no"),
            Some(&Cell::text("123456789012345678"))
        );
    }

    #[test]
    fn datetimes_round_trip() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let result = MatchResult {
            matched: table("Matched", &["receipt no"], vec![]),
            unmatched_left: table(
                "cis",
                &["receipt no", "paid on"],
                vec![vec![Cell::text("R1"), Cell::DateTime(dt)]],
            ),
            unmatched_right: table("tp", &["receipt no"], vec![]),
        };
        let bytes = write_workbook(&result).unwrap();
        let sheets = sheets_from_bytes(&bytes).unwrap();
        assert_eq!(sheets[1].1.get(0, "paid on"), Some(&Cell::DateTime(dt)));
    }

    #[test]
    fn positions_outside_index_range_are_render_errors() {
        assert_eq!(position("Matched", 1, 3).unwrap(), (1, 3));
        let err = position("Matched", 0, 70_000).unwrap_err();
        assert!(matches!(err, ReconError::Render(_)));
        assert!(err.to_string().contains("column 70000 out of range"));
        let err = position("Matched", u32::MAX as usize + 1, 0).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn too_many_columns_is_render_error() {
        // Excel stops at 16,384 columns; 65,537 would also wrap a u16
        let columns: Vec<String> = (0..65_537).map(|i| format!("c{i}")).collect();
        let result = MatchResult {
            matched: Table::with_columns("Matched", columns),
            unmatched_left: table("cis", &["utr no"], vec![]),
            unmatched_right: table("tp", &["utr"], vec![]),
        };
        let err = write_workbook(&result).unwrap_err();
        assert!(matches!(err, ReconError::Render(_)));
    }

    #[test]
    fn excel_serial_epoch() {
        let dt = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&dt), Some(2.5));
    }
}
