use std::fmt;
use std::path::{Path, PathBuf};

use crate::host::LoadedPlugin;

/// Version recorded for loaded plugins that do not report one
pub const UNKNOWN_VERSION: &str = "unknown";

/// One concrete plugin artifact, on disk or staged for placement on disk.
///
/// Immutable: a newer download replaces the value rather than changing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    id: String,
    version: String,
    path: PathBuf,
}

impl Installation {
    pub fn new(id: &str, version: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
            path: path.into(),
        }
    }

    /// Installation describing a plugin the host has loaded
    pub fn from_loaded(plugin: &LoadedPlugin) -> Self {
        Self::new(
            &plugin.id,
            plugin.version.as_deref().unwrap_or(UNKNOWN_VERSION),
            plugin.source.clone(),
        )
    }

    /// The loaded plugin a host reports once it has picked this artifact up
    pub fn to_loaded(&self) -> LoadedPlugin {
        LoadedPlugin::new(&self.id, Some(&self.version), self.path.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.id, self.version, self.path.display())
    }
}

/// Where a plugin ID stands between the host's loaded set and the user's requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerState {
    NotInstalled,
    /// Loaded by the host, nothing pending
    LoadedActive,
    /// Loaded by the host and scheduled for removal
    LoadedPendingRemoval,
    /// Not loaded; artifact placed and waiting for the next host start
    StagedNewInstall { installation: Installation },
    /// Loaded; a replacement artifact waits in the updates staging directory
    StagedUpdate { installation: Installation },
}

impl LedgerState {
    pub fn is_installed(&self) -> bool {
        matches!(
            self,
            LedgerState::LoadedActive | LedgerState::StagedNewInstall { .. } | LedgerState::StagedUpdate { .. }
        )
    }
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerState::NotInstalled => write!(f, "not installed"),
            LedgerState::LoadedActive => write!(f, "installed"),
            LedgerState::LoadedPendingRemoval => write!(f, "pending removal"),
            LedgerState::StagedNewInstall { installation } => {
                write!(f, "pending install (v{})", installation.version())
            }
            LedgerState::StagedUpdate { installation } => {
                write!(f, "pending update (v{})", installation.version())
            }
        }
    }
}
