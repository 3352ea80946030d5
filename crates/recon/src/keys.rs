use std::fmt;

use serde::Serialize;

/// Reconciliation category. Only `ATP` and `NEFT` are special; every other
/// string keeps its text and uses the default key pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReconMode {
    Atp,
    Neft,
    Other(String),
}

impl ReconMode {
    /// Parse a free-form mode string. Matching is exact and case-sensitive.
    pub fn parse(s: &str) -> Self {
        match s {
            "ATP" => Self::Atp,
            "NEFT" => Self::Neft,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Atp => "ATP",
            Self::Neft => "NEFT",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ReconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ReconMode {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Normalized key column names for each side of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPair {
    pub left: &'static str,
    pub right: &'static str,
}

pub const UTR_KEYS: KeyPair = KeyPair {
    left: "utr no",
    right: "utr",
};

pub const RECEIPT_KEYS: KeyPair = KeyPair {
    left: "receipt no",
    right: "receipt no",
};

/// Key columns for a mode. Fixed mapping, never derived from file content.
pub fn select_keys(mode: &ReconMode) -> KeyPair {
    match mode {
        ReconMode::Atp | ReconMode::Neft => UTR_KEYS,
        ReconMode::Other(_) => RECEIPT_KEYS,
    }
}
