// Delimited text import (CSV and tab-separated TXT)

use std::io::Read;
use std::path::Path;

use payrecon_recon::{Cell, ReconError, Table};

use crate::loader::header_names;

/// Cell texts read as missing values, as spreadsheet tools export them.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn import(path: &Path, delimiter: u8) -> Result<Table, ReconError> {
    let display = path.display().to_string();
    let content = read_file_as_utf8(path).map_err(|e| ReconError::load(&display, e))?;
    import_from_string(&display, &content, delimiter)
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("input is not UTF-8, decoded as Windows-1252");
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text. First record is the header; column types are
/// inferred per column from the data rows.
pub fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(result) => result.map_err(|e| ReconError::load(name, e))?,
        None => return Err(ReconError::load(name, "no columns to parse from file")),
    };
    let columns = header_names(header.iter().map(str::to_string).collect());
    let width = columns.len();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (i, result) in records.enumerate() {
        let record = result.map_err(|e| ReconError::load(name, e))?;
        if record.len() > width {
            return Err(ReconError::load(
                name,
                format!("expected {width} fields in line {}, saw {}", i + 2, record.len()),
            ));
        }
        // Short rows are padded with missing values
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        raw_rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| infer_column(raw_rows.iter().map(|r| r[col].as_str())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(value, kind)| kind.cell(value))
                .collect()
        })
        .collect();

    Table::new(name, columns, rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    fn cell(self, value: String) -> Cell {
        if is_na(&value) {
            return Cell::Empty;
        }
        match self {
            ColumnKind::Int => match value.trim().parse::<i64>().ok() {
                Some(n) => Cell::Int(n),
                None => Cell::Text(value),
            },
            ColumnKind::Float => {
                let v = value.trim();
                // Integer literals never pass through f64
                if let Ok(n) = v.parse::<i64>() {
                    return Cell::Int(n);
                }
                match v.parse::<f64>().ok() {
                    Some(n) => number_cell(n),
                    None => Cell::Text(value),
                }
            }
            ColumnKind::Text => Cell::Text(value),
        }
    }
}

fn is_na(value: &str) -> bool {
    NA_VALUES.contains(&value)
}

/// Narrowest type every non-missing value in the column parses as.
fn infer_column<'a>(values: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    let mut any = false;
    for value in values.filter(|v| !is_na(v)) {
        any = true;
        let v = value.trim();
        // Digits beyond i64 would collapse to one float; keep them exact as text
        if is_integer_literal(v) && v.parse::<i64>().is_err() {
            return ColumnKind::Text;
        }
        if kind == ColumnKind::Int && v.parse::<i64>().is_err() {
            kind = ColumnKind::Float;
        }
        if kind == ColumnKind::Float && !parses_as_float(v) {
            return ColumnKind::Text;
        }
    }
    if any {
        kind
    } else {
        ColumnKind::Text
    }
}

/// Optional sign followed by ASCII digits only.
fn is_integer_literal(v: &str) -> bool {
    let digits = v.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(v);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parses_as_float(v: &str) -> bool {
    // Rust accepts "inf"/"infinity" spellings that spreadsheets would keep as text
    let lower = v.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return false;
    }
    v.parse::<f64>().is_ok()
}

/// Integral floats become `Int` so `1.0` and `1` are the same key.
pub(crate) fn number_cell(n: f64) -> Cell {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Cell::Int(n as i64)
    } else {
        Cell::float(n)
    }
}
