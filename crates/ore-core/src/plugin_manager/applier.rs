//! Materializing staged changes at a safe point.
//!
//! Both operations rewrite files in the live installation directory, so the
//! caller may only run them while the host is not using the affected
//! artifacts (typically on shutdown).
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::host::HostSnapshot;
use crate::utils::{move_file, remove_dir_all_if_exists, remove_file_if_exists};

use super::client::OreClient;
use super::error::{PluginManagerError, Result};
use super::installation::Installation;
use super::ledger::StagingSlot;
use super::placement::claim_available_path;

/// What a commit changed in the installation directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    /// New installs, already placed in the installation directory
    pub installed: Vec<Installation>,
    /// Updates moved into the installation directory, at their final paths
    pub updated: Vec<Installation>,
    /// Plugins whose artifacts were removed
    pub removed: Vec<String>,
}

impl AppliedChanges {
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Bring a host snapshot in line with the artifacts now on disk, so the
    /// next session sees what this one left behind.
    pub fn record_in(&self, host: &mut HostSnapshot) {
        for installation in self.installed.iter().chain(&self.updated) {
            host.insert(installation.to_loaded());
        }
        for id in &self.removed {
            host.remove(id);
        }
    }
}

impl OreClient {
    /// Move every staged update into the installation directory, replacing the
    /// artifact currently declaring the same plugin, then purge the updates
    /// directory.
    ///
    /// Each update deletes the old artifact before moving the new one, and a
    /// failed delete stops before the move. The batch is not atomic: updates
    /// applied before a failure stay applied. Returns the number applied.
    pub async fn apply_pending_updates(&mut self) -> Result<usize> {
        Ok(self.apply_updates().await?.len())
    }

    async fn apply_updates(&mut self) -> Result<Vec<Installation>> {
        let pending = self.ledger.pending_update_ids();
        let mut applied = Vec::new();

        if !pending.is_empty() {
            let installed = self.scanner.scan(&self.installation_dir).await?;

            for id in pending {
                let Some(staged) = self.ledger.staged(StagingSlot::Update, &id).cloned() else {
                    continue;
                };

                let obsolete = installed
                    .iter()
                    .filter(|(_, declared)| declared.iter().any(|metadata| metadata.id == id))
                    .map(|(path, _)| path)
                    .min();
                match obsolete {
                    Some(path) => {
                        remove_file_if_exists(path)
                            .await
                            .map_err(|e| PluginManagerError::io(e, "delete obsolete artifact", path.clone()))?;
                        debug!("Deleted obsolete artifact {} of {}", path.display(), id);
                    }
                    None => debug!("No installed artifact declares {}", id),
                }

                let file_name = staged
                    .path()
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| {
                        PluginManagerError::InternalInconsistency(format!(
                            "staged update of {} has no file name: {}",
                            id,
                            staged.path().display()
                        ))
                    })?;

                let target = self.relocate(staged.path(), &file_name).await?;
                self.ledger.unstage(StagingSlot::Update, &id);
                info!("Applied update of {} v{} to {}", id, staged.version(), target.display());
                applied.push(Installation::new(&id, staged.version(), target));
            }
        }

        remove_dir_all_if_exists(&self.updates_dir)
            .await
            .map_err(|e| PluginManagerError::io(e, "purge updates directory", self.updates_dir.clone()))?;

        Ok(applied)
    }

    async fn relocate(&self, staged: &Path, file_name: &str) -> Result<PathBuf> {
        let (target, file) = claim_available_path(&self.installation_dir, file_name)
            .await
            .map_err(|e| PluginManagerError::io(e, "claim artifact path", self.installation_dir.clone()))?;
        drop(file);

        if let Err(e) = move_file(staged, &target).await {
            // drop the empty placeholder
            if let Err(cleanup) = remove_file_if_exists(&target).await {
                warn!("Failed to remove placeholder {}: {}", target.display(), cleanup);
            }
            return Err(PluginManagerError::io(e, "move staged update", staged.to_path_buf()));
        }
        Ok(target)
    }

    /// Delete the artifacts of every plugin scheduled for removal.
    ///
    /// An artifact that is already gone is fine. The host is not told to
    /// unload anything. Returns the number of removals processed.
    pub async fn complete_uninstalls(&mut self) -> Result<usize> {
        Ok(self.complete_removals().await?.len())
    }

    async fn complete_removals(&mut self) -> Result<Vec<String>> {
        let mut completed = Vec::new();
        for id in self.ledger.pending_removal_ids() {
            if let Some(plugin) = self.host.loaded_plugin(&id) {
                let removed = remove_file_if_exists(&plugin.source)
                    .await
                    .map_err(|e| PluginManagerError::io(e, "delete artifact", plugin.source.clone()))?;
                if removed {
                    info!("Removed {} ({})", id, plugin.source.display());
                } else {
                    debug!("Artifact of {} was already gone", id);
                }
            }
            self.ledger.clear_removal(&id);
            completed.push(id);
        }
        Ok(completed)
    }

    /// Apply staged updates and complete pending removals in one go.
    ///
    /// Staged new installs are already in place and are reported as they
    /// are; the ledger keeps them.
    pub async fn commit_pending_changes(&mut self) -> Result<AppliedChanges> {
        let installed = self
            .ledger
            .new_install_ids()
            .iter()
            .filter_map(|id| self.ledger.staged(StagingSlot::NewInstall, id).cloned())
            .collect();
        let updated = self.apply_updates().await?;
        let removed = self.complete_removals().await?;
        Ok(AppliedChanges {
            installed,
            updated,
            removed,
        })
    }
}
