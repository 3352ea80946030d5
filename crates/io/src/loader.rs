// Input loading: pick a decoder by file extension

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use payrecon_recon::{ReconError, Table};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Xls,
    /// Comma-delimited
    Csv,
    /// Tab-delimited
    Txt,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xlsx => write!(f, "xlsx"),
            Self::Xls => write!(f, "xls"),
            Self::Csv => write!(f, "csv"),
            Self::Txt => write!(f, "txt"),
        }
    }
}

/// Load a table from disk. Spreadsheets read their first worksheet.
///
/// Unknown extensions are rejected here even though callers are expected to
/// filter them first.
pub fn load(path: &Path) -> Result<Table, ReconError> {
    let format = InputFormat::from_path(path).ok_or_else(|| {
        ReconError::load(
            path.display().to_string(),
            "unsupported file extension (expected xlsx, xls, csv or txt)",
        )
    })?;

    let table = match format {
        InputFormat::Xlsx | InputFormat::Xls => crate::xlsx::import(path)?,
        InputFormat::Csv => crate::csv::import(path, b',')?,
        InputFormat::Txt => crate::csv::import(path, b'\t')?,
    };

    log::info!(
        "loaded {} as {format}: {} rows, {} columns",
        path.display(),
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Turn raw header cells into unique column names.
///
/// Blank headers become `Unnamed: {index}`; repeats get `.1`, `.2`, ...
pub(crate) fn header_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
