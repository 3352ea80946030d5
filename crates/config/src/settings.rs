// Run settings
// Loaded from ~/.config/payrecon/settings.toml (or an explicit --config path)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted as reconciliation inputs.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "csv", "txt"];

/// How published artifacts are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// `{mode}_{run_id}_output.xlsx`: every run gets its own files
    #[default]
    RunId,
    /// `{mode}_output.xlsx`: a later run with the same mode replaces the files
    Mode,
}

/// Summary chart canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where workbooks and charts are published
    pub result_dir: PathBuf,

    /// Where bare input file names are looked up
    pub upload_dir: PathBuf,

    /// Lower-case extensions accepted for inputs
    pub allowed_extensions: Vec<String>,

    pub artifact_naming: ArtifactNaming,

    pub chart: ChartSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            result_dir: PathBuf::from("results"),
            upload_dir: PathBuf::from("uploads"),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            artifact_naming: ArtifactNaming::RunId,
            chart: ChartSettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read settings {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid settings {}: {message}", path.display())
            }
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Settings {
    /// Default settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("payrecon");
        config_dir.join("settings.toml")
    }

    /// Load from the default path; a missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. The file must exist and parse.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        for ext in &mut settings.allowed_extensions {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid("allowed_extensions is empty".into()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "chart size must be non-zero, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }

    /// True if the file name carries one of the allowed extensions.
    pub fn is_allowed(&self, path: &Path) -> bool {
        match extension_of(path) {
            Some(ext) => self.allowed_extensions.iter().any(|a| *a == ext),
            None => false,
        }
    }

    /// Resolve an input argument: bare file names that do not exist in the
    /// working directory are looked up in `upload_dir`.
    pub fn resolve_input(&self, path: &Path) -> PathBuf {
        let is_bare = path.components().count() == 1;
        if is_bare && !path.exists() {
            let candidate = self.upload_dir.join(path);
            if candidate.exists() {
                return candidate;
            }
        }
        path.to_path_buf()
    }
}

/// Lower-cased extension after the last dot, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
