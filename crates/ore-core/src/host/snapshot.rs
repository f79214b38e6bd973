use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::storage::error::StorageSystemError;

use super::{LoadedPlugin, PluginHost, DEFAULT_API_ID};

fn default_api_id() -> String {
    DEFAULT_API_ID.to_string()
}

/// Serialized form of a snapshot file
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawSnapshot {
    #[serde(default = "default_api_id")]
    api_id: String,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    plugins: Vec<LoadedPlugin>,
}

/// A [`PluginHost`] built from a fixed list of loaded plugins.
///
/// The host process writes its loaded set as JSON; standalone tools read it
/// back with [`HostSnapshot::load`].
#[derive(Debug, Clone)]
pub struct HostSnapshot {
    api_id: String,
    api_version: Option<String>,
    plugins: BTreeMap<String, LoadedPlugin>,
}

impl Default for HostSnapshot {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HostSnapshot {
    /// Create an empty snapshot using the default platform API identifier
    pub fn new(api_version: Option<&str>) -> Self {
        Self {
            api_id: DEFAULT_API_ID.to_string(),
            api_version: api_version.map(str::to_string),
            plugins: BTreeMap::new(),
        }
    }

    /// Override the platform API identifier
    pub fn with_api_id(mut self, api_id: &str) -> Self {
        self.api_id = api_id.to_string();
        self
    }

    /// Add (or replace) a loaded plugin
    pub fn with_plugin(mut self, plugin: LoadedPlugin) -> Self {
        self.insert(plugin);
        self
    }

    /// Add (or replace) a loaded plugin
    pub fn insert(&mut self, plugin: LoadedPlugin) {
        self.plugins.insert(plugin.id.clone(), plugin);
    }

    /// Forget a loaded plugin, as the host does once it unloads it
    pub fn remove(&mut self, id: &str) -> Option<LoadedPlugin> {
        self.plugins.remove(id)
    }

    /// Read a snapshot file; a missing file yields an empty host.
    pub fn load(path: &Path) -> Result<Self, StorageSystemError> {
        if !path.exists() {
            debug!("No host snapshot at {:?}, assuming nothing is loaded", path);
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| StorageSystemError::io(e, "read_host_snapshot", path.to_path_buf()))?;
        let raw: RawSnapshot = serde_json::from_str(&data).map_err(|e| {
            StorageSystemError::DeserializationError {
                format: "json".to_string(),
                source: Box::new(e),
            }
        })?;

        let mut snapshot = Self::new(raw.api_version.as_deref()).with_api_id(&raw.api_id);
        for plugin in raw.plugins {
            snapshot.insert(plugin);
        }
        Ok(snapshot)
    }

    /// Write the snapshot as JSON
    pub fn save(&self, path: &Path) -> Result<(), StorageSystemError> {
        let raw = RawSnapshot {
            api_id: self.api_id.clone(),
            api_version: self.api_version.clone(),
            plugins: self.plugins.values().cloned().collect(),
        };
        let data = serde_json::to_string_pretty(&raw).map_err(|e| {
            StorageSystemError::SerializationError {
                format: "json".to_string(),
                source: Box::new(e),
            }
        })?;
        std::fs::write(path, data)
            .map_err(|e| StorageSystemError::io(e, "write_host_snapshot", path.to_path_buf()))
    }
}

impl PluginHost for HostSnapshot {
    fn api_id(&self) -> &str {
        &self.api_id
    }

    fn api_version(&self) -> Option<String> {
        self.api_version.clone()
    }

    fn loaded_plugins(&self) -> Vec<LoadedPlugin> {
        self.plugins.values().cloned().collect()
    }

    fn loaded_plugin(&self, id: &str) -> Option<LoadedPlugin> {
        self.plugins.get(id).cloned()
    }

    fn is_loaded(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }
}
