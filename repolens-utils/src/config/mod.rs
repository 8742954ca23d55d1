//! Configuration file loading
//!
//! Configuration files are picked by extension: `.toml`, `.json`, `.yaml`
//! and `.yml` are understood. Everything else is rejected.

use serde::Deserialize;
use std::path::Path;

use crate::UtilError;

/// Supported on-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            _ => Err(UtilError::Config(format!(
                "Unsupported config format: {extension}"
            ))),
        }
    }
}

/// Parse configuration text in the given format
pub fn parse_config<T>(content: &str, format: ConfigFormat) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| UtilError::Config(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| UtilError::Config(format!("JSON parse error: {e}"))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| UtilError::Config(format!("YAML parse error: {e}"))),
    }
}

/// Load configuration from file (format auto-detected from the extension)
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    tracing::debug!("Loading {:?} configuration from {}", format, path.display());
    parse_config(&content, format)
}

/// Load configuration from an optional path, falling back to `T::default()`
pub fn load_config_or_default<T>(path: Option<&Path>) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match path {
        Some(path) => load_config(path),
        None => Ok(T::default()),
    }
}
