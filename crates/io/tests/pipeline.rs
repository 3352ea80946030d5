// End-to-end runs over files on disk

use std::fs;
use std::path::{Path, PathBuf};

use payrecon_config::{ArtifactNaming, Settings};
use payrecon_io::xlsx::{sheets_from_bytes, MATCHED_SHEET, UNMATCHED_LEFT_SHEET, UNMATCHED_RIGHT_SHEET};
use payrecon_io::{load, new_run_id, run_files, ArtifactStore, ChartOptions};
use payrecon_recon::{Cell, ReconError, ReconMode, Side};
use tempfile::{tempdir, TempDir};

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_xlsx(dir: &TempDir, name: &str, header: &[&str], rows: &[&[&str]]) -> PathBuf {
    let path = dir.path().join(name);
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in header.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            sheet.write_string(r as u32 + 1, c as u16, *v).unwrap();
        }
    }
    workbook.save(&path).unwrap();
    path
}

fn store(root: &Path) -> ArtifactStore {
    let settings = Settings {
        result_dir: root.to_path_buf(),
        artifact_naming: ArtifactNaming::RunId,
        ..Settings::default()
    };
    ArtifactStore::new(&settings)
}

fn key_column(sheet: &payrecon_recon::Table, column: &str) -> Vec<Cell> {
    (0..sheet.len())
        .map(|i| sheet.get(i, column).cloned().unwrap_or_default())
        .collect()
}

#[test]
fn atp_duplicates_end_to_end() {
    let dir = tempdir().unwrap();
    let left = write(&dir, "cis.csv", "UTR No,Amount\nA1,100\nA2,200\nA2,250\n");
    let right = write_xlsx(&dir, "tp.xlsx", &[" UTR ", "Status"], &[&["A2", "ok"], &["A3", "ok"]]);

    let run = run_files(&left, &right, &ReconMode::Atp, &ChartOptions::default()).unwrap();
    assert_eq!(run.reconciliation.summary.counts(), [3, 2, 2, 1, 1]);

    let out = tempdir().unwrap();
    let paths = store(out.path()).publish("ATP", &new_run_id(), &run).unwrap();
    assert!(paths.workbook.exists());
    assert!(paths.chart.exists());

    let sheets = sheets_from_bytes(&fs::read(&paths.workbook).unwrap()).unwrap();
    let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec![MATCHED_SHEET, UNMATCHED_LEFT_SHEET, UNMATCHED_RIGHT_SHEET]);

    let matched = &sheets[0].1;
    assert_eq!(matched.columns(), &["utr no", "amount", "utr", "status"]);
    assert_eq!(key_column(matched, "amount"), vec![Cell::Int(200), Cell::Int(250)]);
    assert_eq!(key_column(&sheets[1].1, "utr no"), vec![Cell::text("A1")]);
    assert_eq!(key_column(&sheets[2].1, "utr"), vec![Cell::text("A3")]);

    let png = image::open(&paths.chart).unwrap();
    assert_eq!((png.width(), png.height()), (800, 400));
}

#[test]
fn long_numeric_utrs_differing_in_last_digit_do_not_match() {
    let dir = tempdir().unwrap();
    let left = write(&dir, "cis.csv", "UTR No\n12345678901234567890\n");
    let right = write(&dir, "tp.csv", "UTR\n12345678901234567891\n");

    let run = run_files(&left, &right, &ReconMode::Atp, &ChartOptions::default()).unwrap();
    assert_eq!(run.reconciliation.summary.counts(), [1, 1, 0, 1, 1]);

    // Digits survive into the workbook
    let sheets = sheets_from_bytes(&run.workbook).unwrap();
    assert_eq!(
        key_column(&sheets[1].1, "utr no"),
        vec![Cell::text("12345678901234567890")]
    );
}

#[test]
fn neft_missing_column_produces_no_artifacts() {
    let dir = tempdir().unwrap();
    let left = write(&dir, "cis.csv", "Reference,Amount\nA1,100\n");
    let right = write(&dir, "tp.txt", "UTR\tAmount\nA1\t100\n");

    let err = run_files(&left, &right, &ReconMode::Neft, &ChartOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ReconError::MissingColumn {
            side: Side::Left,
            column: "utr no".into()
        }
    );
    assert_eq!(err.to_string(), "left table: missing key column 'utr no'");
}

#[test]
fn empty_inputs_still_publish() {
    let dir = tempdir().unwrap();
    let left = write(&dir, "cis.csv", "Receipt No,Amount\n");
    let right = write(&dir, "tp.csv", "receipt no,Amount\n");

    let mode = ReconMode::parse("CASH");
    let run = run_files(&left, &right, &mode, &ChartOptions::default()).unwrap();
    assert_eq!(run.reconciliation.summary.counts(), [0; 5]);

    let out = tempdir().unwrap();
    let paths = store(out.path()).publish("CASH", "r1", &run).unwrap();
    let sheets = sheets_from_bytes(&fs::read(&paths.workbook).unwrap()).unwrap();
    assert_eq!(sheets.len(), 3);
    assert!(sheets.iter().all(|(_, t)| t.is_empty()));
    assert_eq!(
        sheets[0].1.columns(),
        &["receipt no", "amount_x", "amount_y"]
    );
    assert!(image::open(&paths.chart).is_ok());
}

#[test]
fn other_mode_joins_on_receipt_no() {
    let dir = tempdir().unwrap();
    let left = write(&dir, "cis.txt", "Receipt No\tAmount\nR1\t10\nR2\t20\n");
    let right = write(&dir, "tp.csv", "RECEIPT NO,Amount\nR2,20\nR9,5\n");

    let run = run_files(&left, &right, &ReconMode::parse("UPI"), &ChartOptions::default()).unwrap();
    let result = &run.reconciliation.result;
    assert_eq!(result.matched.len(), 1);
    assert_eq!(result.matched.get(0, "amount_x"), Some(&Cell::Int(20)));
    assert_eq!(result.matched.get(0, "amount_y"), Some(&Cell::Int(20)));
}

#[test]
fn load_reads_first_sheet_of_xlsx() {
    let dir = tempdir().unwrap();
    let path = write_xlsx(&dir, "book.xlsx", &["UTR", "UTR"], &[&["X", "Y"]]);
    let table = load(&path).unwrap();
    assert_eq!(table.columns(), &["UTR", "UTR.1"]);
    assert_eq!(table.get(0, "UTR.1"), Some(&Cell::text("Y")));
}

#[test]
fn unreadable_file_is_load_error() {
    let dir = tempdir().unwrap();
    let right = write(&dir, "tp.csv", "utr\nA1\n");
    let missing = dir.path().join("nope.csv");
    let err = run_files(&missing, &right, &ReconMode::Atp, &ChartOptions::default()).unwrap_err();
    assert!(matches!(err, ReconError::Load { .. }));
}
