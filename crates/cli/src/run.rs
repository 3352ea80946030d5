//! `payrecon run`: reconcile two files and publish the workbook and chart.

use std::path::{Path, PathBuf};

use serde::Serialize;

use payrecon_config::Settings;
use payrecon_io::{new_run_id, run_files, ArtifactPaths, ArtifactStore, ChartOptions};
use payrecon_recon::summary::format_thousands;
use payrecon_recon::{KeyPair, ReconMode, Summary};

use crate::CliError;

pub struct RunArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub mode: String,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub run_id: Option<String>,
}

/// JSON report for one run.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    mode: &'a str,
    keys: KeyPair,
    summary: Summary,
    artifacts: &'a ArtifactPaths,
}

pub fn cmd_run(settings: &Settings, args: RunArgs) -> Result<(), CliError> {
    check_extension(settings, &args.left)?;
    check_extension(settings, &args.right)?;

    let mode = ReconMode::parse(&args.mode);
    let chart = ChartOptions::from(settings.chart);

    let artifacts = run_files(&args.left, &args.right, &mode, &chart)?;

    let mut store = ArtifactStore::new(settings);
    if let Some(dir) = args.out_dir {
        store = store.with_root(dir);
    }
    let run_id = args.run_id.unwrap_or_else(new_run_id);
    let paths = store.publish(mode.as_str(), &run_id, &artifacts)?;

    let recon = &artifacts.reconciliation;
    let report = RunReport {
        run_id: &run_id,
        mode: mode.as_str(),
        keys: recon.keys.clone(),
        summary: recon.summary,
        artifacts: &paths,
    };

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    // Human summary to stderr
    eprintln!(
        "{} reconciliation on '{}' = '{}'",
        mode, recon.keys.left, recon.keys.right
    );
    for (label, count) in recon.summary.entries() {
        eprintln!("  {label:<32} {:>12}", format_thousands(count));
    }
    eprintln!("workbook: {}", paths.workbook.display());
    eprintln!("chart:    {}", paths.chart.display());

    Ok(())
}

fn check_extension(settings: &Settings, path: &Path) -> Result<(), CliError> {
    if settings.is_allowed(path) {
        return Ok(());
    }
    Err(CliError::usage(format!("unsupported file type: {}", path.display())).with_hint(format!(
        "allowed extensions: {}",
        settings.allowed_extensions.join(", ")
    )))
}
