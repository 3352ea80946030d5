//! `payrecon check`: load inputs the way `run` would, without reconciling.

use std::path::PathBuf;

use serde::Serialize;

use payrecon_config::Settings;
use payrecon_io::{load, InputFormat};
use payrecon_recon::normalize::normalize_column_name;

use crate::CliError;

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Every file is checked; the exit code comes from the first failure.
pub fn cmd_check(settings: &Settings, files: &[PathBuf], json: bool) -> Result<(), CliError> {
    let mut reports = Vec::with_capacity(files.len());
    let mut first_error: Option<CliError> = None;

    for file in files {
        let path = settings.resolve_input(file);
        match check_one(settings, &path) {
            Ok((format, rows, columns)) => reports.push(FileReport {
                path,
                format: Some(format.to_string()),
                rows: Some(rows),
                columns: Some(columns),
                error: None,
            }),
            Err(err) => {
                reports.push(FileReport {
                    path,
                    format: None,
                    rows: None,
                    columns: None,
                    error: Some(err.message.clone()),
                });
                first_error.get_or_insert(err);
            }
        }
    }

    if json {
        let json_str = serde_json::to_string_pretty(&reports)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        for r in &reports {
            match (&r.error, &r.format, &r.rows, &r.columns) {
                (None, Some(format), Some(rows), Some(columns)) => {
                    println!("{}: {format}, {rows} rows", r.path.display());
                    println!("  columns: {}", columns.join(", "));
                }
                (Some(error), ..) => println!("{}: FAILED ({error})", r.path.display()),
                _ => {}
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn check_one(
    settings: &Settings,
    path: &std::path::Path,
) -> Result<(InputFormat, usize, Vec<String>), CliError> {
    let format = match InputFormat::from_path(path) {
        Some(f) if settings.is_allowed(path) => f,
        _ => {
            return Err(CliError::usage(format!(
                "unsupported file type: {}",
                path.display()
            )))
        }
    };
    let table = load(path)?;
    let columns = table.columns().iter().map(|c| normalize_column_name(c)).collect();
    Ok((format, table.len(), columns))
}
