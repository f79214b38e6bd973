use std::fmt;

use log::debug;

use crate::catalog::RECOMMENDED_VERSION;

use super::client::OreClient;
use super::error::{PluginManagerError, Result};
use super::installation::UNKNOWN_VERSION;
use super::ledger::StagingSlot;

/// A loaded plugin whose recommended catalog version differs from the loaded one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    pub id: String,
    pub installed_version: Option<String>,
    pub recommended_version: String,
}

impl fmt::Display for AvailableUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: v{} -> v{}",
            self.id,
            self.installed_version.as_deref().unwrap_or(UNKNOWN_VERSION),
            self.recommended_version
        )
    }
}

impl OreClient {
    /// Whether the catalog recommends a different version than the installed one.
    ///
    /// A plugin the catalog does not know never has an update.
    pub async fn is_update_available(&self, id: &str) -> Result<bool> {
        self.check_installed(id)?;

        let Some(project) = self.catalog.project(id).await? else {
            return Ok(false);
        };

        let current = self
            .installation(id)
            .map(|installation| installation.version().to_string())
            .ok_or_else(|| PluginManagerError::PluginNotInstalled(id.to_string()))?;

        Ok(current != RECOMMENDED_VERSION && current != project.recommended_version.name)
    }

    /// Compare every loaded plugin against the catalog's recommended versions.
    ///
    /// Plugins in the ignore list and plugins unknown to the catalog are
    /// skipped. The result is sorted by plugin ID.
    pub async fn available_updates(&self) -> Result<Vec<AvailableUpdate>> {
        let mut plugins = self.host.loaded_plugins();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));

        let mut updates = Vec::new();
        for plugin in plugins {
            if self.ignored_plugins.contains(&plugin.id) {
                debug!("Skipping ignored plugin {}", plugin.id);
                continue;
            }

            let Some(project) = self.catalog.project(&plugin.id).await? else {
                continue;
            };

            let recommended = project.recommended_version.name;
            if plugin.version.as_deref() != Some(recommended.as_str()) {
                updates.push(AvailableUpdate {
                    id: plugin.id,
                    installed_version: plugin.version,
                    recommended_version: recommended,
                });
            }
        }

        Ok(updates)
    }

    /// Stage a new version of an installed plugin.
    ///
    /// With the "recommended" token this fails with
    /// [`PluginManagerError::NoUpdateAvailable`] when the installed version is
    /// already the recommended one. A loaded plugin's artifact waits in the
    /// updates directory; a plugin that is only staged as a new install gets its
    /// staged artifact replaced.
    pub async fn update_plugin(&mut self, id: &str, version: &str) -> Result<()> {
        self.check_installed(id)?;

        if version == RECOMMENDED_VERSION && !self.is_update_available(id).await? {
            return Err(PluginManagerError::NoUpdateAvailable(id.to_string()));
        }

        let version = self.resolve_version(id, version).await?;
        self.notify(&format!("Updating {} to v{}...", id, version));

        let slot = StagingSlot::for_host(self.host.is_loaded(id));
        let installation = self.fetch_artifact(id, &version, &self.slot_dir(slot)).await?;
        self.stage_download(slot, installation).await
    }
}
