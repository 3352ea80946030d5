// Configuration loading

pub mod settings;

pub use settings::{extension_of, ArtifactNaming, ChartSettings, ConfigError, Settings};
