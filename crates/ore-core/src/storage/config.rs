use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog::http::DEFAULT_TIMEOUT_SECS;
use crate::storage::error::{Result, StorageSystemError};

/// Default catalog repository
pub const DEFAULT_REPOSITORY_URL: &str = "https://ore.spongepowered.org";

/// Default live plugin directory
pub const DEFAULT_INSTALLATION_DIR: &str = "mods";

/// Default staging directory for updates of loaded plugins
pub const DEFAULT_UPDATES_DIR: &str = "updates";

/// Default directory for plain downloads
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the catalog
    pub repository_url: String,
    /// Live plugin directory shared with the host
    pub installation_directory: PathBuf,
    /// Staging directory for updates of loaded plugins
    pub updates_directory: PathBuf,
    /// Target of plain downloads
    pub downloads_directory: PathBuf,
    /// Plugins never reported by update checks
    pub ignored_plugins: BTreeSet<String>,
    /// Timeout applied to every catalog request
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            repository_url: DEFAULT_REPOSITORY_URL.to_string(),
            installation_directory: PathBuf::from(DEFAULT_INSTALLATION_DIR),
            updates_directory: PathBuf::from(DEFAULT_UPDATES_DIR),
            downloads_directory: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            ignored_plugins: BTreeSet::new(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Configuration rooted at `base`: all default directories live inside it.
    pub fn rooted_at(base: &Path) -> Self {
        Self::default().resolve_relative_to(base)
    }

    /// Load a configuration file, picking the format from its extension.
    ///
    /// A missing file yields the defaults. Relative directories are resolved
    /// against the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;

        if !path.exists() {
            info!("No configuration at {:?}, using defaults", path);
            return Ok(Self::rooted_at(base));
        }

        let data = fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_config", path.to_path_buf()))?;
        let config = Self::deserialize(&data, format)?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config.resolve_relative_to(base))
    }

    /// Write the configuration, picking the format from the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
        let data = self.serialize(format)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageSystemError::io(e, "create_config_dir", parent.to_path_buf()))?;
        }
        fs::write(path, data).map_err(|e| StorageSystemError::io(e, "write_config", path.to_path_buf()))
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| serialization_error(format, e))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| serialization_error(format, e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| serialization_error(format, e)),
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization_error(format, e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization_error(format, e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error(format, e)),
        }
    }

    /// Resolve relative directories against `base`
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.installation_directory,
            &mut self.updates_directory,
            &mut self.downloads_directory,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    /// Timeout applied to every catalog request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn serialization_error<E>(format: ConfigFormat, source: E) -> StorageSystemError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageSystemError::SerializationError {
        format: format.extension().to_string(),
        source: Box::new(source),
    }
}

fn deserialization_error<E>(format: ConfigFormat, source: E) -> StorageSystemError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StorageSystemError::DeserializationError {
        format: format.extension().to_string(),
        source: Box::new(source),
    }
}
