//! # Plugin Host
//!
//! Read-only view of the running host process: which plugins it currently has
//! loaded, where each one was loaded from, and which platform API version the
//! host implements. The plugin manager never asks the host to load or unload
//! anything; it only consults this oracle.
pub mod snapshot;

use std::path::PathBuf;

pub use snapshot::HostSnapshot;

/// Platform API identifier used by Sponge hosts.
pub const DEFAULT_API_ID: &str = "spongeapi";

/// A plugin currently loaded by the host
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadedPlugin {
    /// Plugin ID
    pub id: String,

    /// Version reported by the plugin, if any
    #[serde(default)]
    pub version: Option<String>,

    /// Artifact the plugin was loaded from
    pub source: PathBuf,
}

impl LoadedPlugin {
    pub fn new(id: &str, version: Option<&str>, source: impl Into<PathBuf>) -> Self {
        Self {
            id: id.to_string(),
            version: version.map(str::to_string),
            source: source.into(),
        }
    }
}

/// Oracle over the host's loaded plugin set.
pub trait PluginHost: Send + Sync {
    /// Identifier under which plugins declare a dependency on the platform API
    fn api_id(&self) -> &str;

    /// Platform API version the host implements, e.g. "7.2.0"
    fn api_version(&self) -> Option<String>;

    /// All currently loaded plugins
    fn loaded_plugins(&self) -> Vec<LoadedPlugin>;

    /// A loaded plugin by ID
    fn loaded_plugin(&self, id: &str) -> Option<LoadedPlugin> {
        self.loaded_plugins().into_iter().find(|plugin| plugin.id == id)
    }

    /// Check if a plugin is loaded
    fn is_loaded(&self, id: &str) -> bool {
        self.loaded_plugin(id).is_some()
    }
}
