//! Converter configuration from mdocx.toml

use crate::output::is_valid_timestamp_format;
use crate::styles::StyleTypeTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name looked up next to the input
pub const CONFIG_FILE_NAME: &str = "mdocx.toml";

/// Main converter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Base style name per element kind
    pub styles: StyleTypeTable,

    /// Presentation of inline code spans
    pub code_span: CodeSpanFormat,

    /// Output file naming
    pub output: OutputConfig,
}

/// Fixed presentation attributes applied to inline code spans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSpanFormat {
    /// Monospace font family
    pub font: String,

    /// Font size in points
    pub size: f32,

    /// Foreground colour as RRGGBB hex
    pub color: String,

    /// Background shading as RRGGBB hex
    pub shading: String,
}

impl Default for CodeSpanFormat {
    fn default() -> Self {
        Self {
            font: "Consolas".to_string(),
            size: 9.0,
            color: "505050".to_string(),
            shading: "F0F0F0".to_string(),
        }
    }
}

impl CodeSpanFormat {
    /// Font size in half-points, the unit WordprocessingML uses
    pub fn half_points(&self) -> u32 {
        (self.size * 2.0).round().max(1.0) as u32
    }
}

/// Output naming options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// chrono format string for the timestamp prefix
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a TOML file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ConverterConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading, parsing or validating the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;

        let config: ConverterConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        let format = &self.output.timestamp_format;
        if !is_valid_timestamp_format(format) {
            return Err(ConfigError::InvalidTimestampFormat(format.clone()));
        }
        Ok(())
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().is_file() {
            Self::load(path)
        } else {
            log::debug!(
                "No configuration at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading the file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// `output.timestamp_format` has a specifier chrono does not know
    InvalidTimestampFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::InvalidTimestampFormat(format) => {
                write!(f, "Invalid output.timestamp_format {:?}", format)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
