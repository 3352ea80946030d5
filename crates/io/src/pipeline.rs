// End-to-end run: load, reconcile, render both artifacts in memory

use std::path::Path;

use payrecon_recon::{reconcile, ReconError, ReconMode, Reconciliation, Table};

use crate::chart::{render_chart, ChartOptions};
use crate::loader;
use crate::xlsx::write_workbook;

/// Everything a run produces before anything touches the result directory.
#[derive(Debug)]
pub struct RunArtifacts {
    pub reconciliation: Reconciliation,
    /// xlsx bytes
    pub workbook: Vec<u8>,
    /// PNG bytes
    pub chart_png: Vec<u8>,
}

/// Reconcile two already-loaded tables and render the chart and workbook.
///
/// Fails before rendering if the tables cannot be matched, so an error
/// never leaves half a set of artifacts behind.
pub fn run_tables(
    left: Table,
    right: Table,
    mode: &ReconMode,
    chart: &ChartOptions,
) -> Result<RunArtifacts, ReconError> {
    let reconciliation = reconcile(left, right, mode)?;
    let chart_png = render_chart(mode.as_str(), &reconciliation.summary, chart)?;
    let workbook = write_workbook(&reconciliation.result)?;

    log::debug!(
        "rendered artifacts for {mode}: workbook {} bytes, chart {} bytes",
        workbook.len(),
        chart_png.len()
    );

    Ok(RunArtifacts {
        reconciliation,
        workbook,
        chart_png,
    })
}

/// Load both files and run [`run_tables`] on them.
pub fn run_files(
    left: &Path,
    right: &Path,
    mode: &ReconMode,
    chart: &ChartOptions,
) -> Result<RunArtifacts, ReconError> {
    let left = loader::load(left)?;
    let right = loader::load(right)?;
    run_tables(left, right, mode, chart)
}
