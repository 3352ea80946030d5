// File I/O: input loading, workbook and chart rendering, artifact publishing

pub mod artifacts;
pub mod chart;
pub mod csv;
pub mod loader;
pub mod pipeline;
pub mod xlsx;

pub use artifacts::{new_run_id, ArtifactPaths, ArtifactStore};
pub use chart::{render_chart, render_svg, ChartOptions};
pub use loader::{load, InputFormat};
pub use pipeline::{run_files, run_tables, RunArtifacts};
pub use xlsx::write_workbook;
