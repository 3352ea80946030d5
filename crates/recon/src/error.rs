use std::fmt;

use crate::model::Side;

/// Every way a reconciliation run can fail. All variants end the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Input could not be read or parsed (unsupported extension, corrupt file, ...).
    Load { path: String, cause: String },
    /// Two columns collapse to the same name after normalization.
    Schema { side: Side, column: String },
    /// Required key column absent after normalization.
    MissingColumn { side: Side, column: String },
    /// Chart or workbook serialization failed.
    Render(String),
    /// Artifact could not be written or published.
    Io(String),
}

impl ReconError {
    pub fn load(path: impl Into<String>, cause: impl fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { path, cause } => write!(f, "cannot load '{path}': {cause}"),
            Self::Schema { side, column } => write!(
                f,
                "{side} table: column '{column}' collides with another column after normalization"
            ),
            Self::MissingColumn { side, column } => {
                write!(f, "{side} table: missing key column '{column}'")
            }
            Self::Render(msg) => write!(f, "render error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
