// Publishing rendered artifacts into the result directory

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use payrecon_config::{ArtifactNaming, Settings};
use payrecon_recon::ReconError;

use crate::pipeline::RunArtifacts;

/// Final locations of one run's files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub workbook: PathBuf,
    pub chart: PathBuf,
}

/// Writes workbooks and charts under `result_dir`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    naming: ArtifactNaming,
}

impl ArtifactStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.result_dir.clone(),
            naming: settings.artifact_naming,
        }
    }

    /// Store rooted somewhere other than the configured result directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a run's artifacts will land. No filesystem access.
    pub fn paths_for(&self, mode: &str, run_id: &str) -> ArtifactPaths {
        let stem = match self.naming {
            ArtifactNaming::RunId => format!("{}_{}", sanitize(mode), sanitize(run_id)),
            ArtifactNaming::Mode => sanitize(mode),
        };
        ArtifactPaths {
            workbook: self.root.join(format!("{stem}_output.xlsx")),
            chart: self.root.join(format!("{stem}_summary_chart.png")),
        }
    }

    /// Write both artifacts. Each file is staged under a unique temporary
    /// name in the result directory and renamed into place, so concurrent
    /// runs with the same names never see each other's partial files.
    ///
    /// If the chart cannot be published the new workbook is removed, along
    /// with any earlier chart at the same path, so the directory never holds
    /// a chart without its workbook.
    pub fn publish(
        &self,
        mode: &str,
        run_id: &str,
        artifacts: &RunArtifacts,
    ) -> Result<ArtifactPaths, ReconError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            ReconError::Io(format!(
                "failed to create result directory {}: {e}",
                self.root.display()
            ))
        })?;

        let paths = self.paths_for(mode, run_id);
        // Stage both before either becomes visible
        let workbook = stage(&self.root, &artifacts.workbook)?;
        let chart = stage(&self.root, &artifacts.chart_png)?;

        persist(workbook, &paths.workbook)?;
        if let Err(e) = persist(chart, &paths.chart) {
            rollback(&paths);
            return Err(e);
        }

        log::info!(
            "published {} and {}",
            paths.workbook.display(),
            paths.chart.display()
        );
        Ok(paths)
    }
}

/// Write bytes to a fresh temporary file in `dir`. Dropped unpersisted, the
/// file is deleted.
fn stage(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile, ReconError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".payrecon-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            ReconError::Io(format!("failed to create temporary file in {}: {e}", dir.display()))
        })?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ReconError::Io(format!("failed to write {}: {e}", tmp.path().display())))?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<(), ReconError> {
    tmp.persist(path)
        .map(|_| ())
        .map_err(|e| ReconError::Io(format!("failed to rename tmp to {}: {}", path.display(), e.error)))
}

fn rollback(paths: &ArtifactPaths) {
    let mut stale = vec![paths.workbook.as_path()];
    if paths.chart.is_file() {
        stale.push(paths.chart.as_path());
    }
    for path in stale {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("could not remove {} after failed publish: {e}", path.display());
        }
    }
}

/// File-name-safe form of a mode or run id: anything outside
/// `[A-Za-z0-9_-]` becomes `_`.
pub fn sanitize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Fresh run identifier.
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
