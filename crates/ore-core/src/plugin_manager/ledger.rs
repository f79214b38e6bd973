use std::collections::{HashMap, HashSet};

use crate::host::PluginHost;

use super::installation::{Installation, LedgerState};

/// The two places a downloaded artifact can wait in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagingSlot {
    /// Plugin not loaded: the artifact goes straight into the installation directory
    NewInstall,
    /// Plugin loaded: the artifact waits in the updates directory until the next apply
    Update,
}

impl StagingSlot {
    /// Slot selected by the host's loaded status
    pub fn for_host(loaded: bool) -> Self {
        if loaded {
            StagingSlot::Update
        } else {
            StagingSlot::NewInstall
        }
    }

    fn other(self) -> Self {
        match self {
            StagingSlot::NewInstall => StagingSlot::Update,
            StagingSlot::Update => StagingSlot::NewInstall,
        }
    }
}

/// Bookkeeping of staged installs, staged updates and pending removals.
///
/// The ledger only records decisions; it never touches the filesystem. Callers
/// delete the files of the installations it hands back when superseding or
/// discarding entries.
///
/// Invariants:
/// - an ID is staged in at most one slot at a time
/// - an ID is pending removal only while the host has it loaded
#[derive(Debug, Default)]
pub struct InstallationLedger {
    new_installs: HashMap<String, Installation>,
    updates: HashMap<String, Installation>,
    removals: HashSet<String>,
}

impl InstallationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: StagingSlot) -> &HashMap<String, Installation> {
        match slot {
            StagingSlot::NewInstall => &self.new_installs,
            StagingSlot::Update => &self.updates,
        }
    }

    fn slot_mut(&mut self, slot: StagingSlot) -> &mut HashMap<String, Installation> {
        match slot {
            StagingSlot::NewInstall => &mut self.new_installs,
            StagingSlot::Update => &mut self.updates,
        }
    }

    /// True if the plugin is loaded and not pending removal, or not loaded and
    /// staged as a new install.
    pub fn is_installed(&self, id: &str, host: &dyn PluginHost) -> bool {
        let loaded = host.is_loaded(id);
        let removal_pending = self.removals.contains(id);
        (loaded && !removal_pending) || (!loaded && self.new_installs.contains_key(id))
    }

    /// The installation reported for an installed plugin.
    ///
    /// A staged update shadows the loaded version, then a staged new install,
    /// then whatever the host loaded.
    pub fn installation(&self, id: &str, host: &dyn PluginHost) -> Option<Installation> {
        if !self.is_installed(id, host) {
            return None;
        }

        if let Some(update) = self.updates.get(id) {
            return Some(update.clone());
        }

        if let Some(install) = self.new_installs.get(id) {
            return Some(install.clone());
        }

        host.loaded_plugin(id).map(|plugin| Installation::from_loaded(&plugin))
    }

    /// Full state of a plugin ID
    pub fn state(&self, id: &str, host: &dyn PluginHost) -> LedgerState {
        if host.is_loaded(id) {
            if self.removals.contains(id) {
                LedgerState::LoadedPendingRemoval
            } else if let Some(update) = self.updates.get(id) {
                LedgerState::StagedUpdate {
                    installation: update.clone(),
                }
            } else {
                LedgerState::LoadedActive
            }
        } else if let Some(install) = self.new_installs.get(id) {
            LedgerState::StagedNewInstall {
                installation: install.clone(),
            }
        } else {
            LedgerState::NotInstalled
        }
    }

    /// The installation staged in a slot for an ID
    pub fn staged(&self, slot: StagingSlot, id: &str) -> Option<&Installation> {
        self.slot(slot).get(id)
    }

    /// Stage an installation, returning every entry it supersedes.
    ///
    /// Any entry for the same ID in the other slot is superseded as well, so an
    /// ID never sits in both slots.
    pub fn stage(&mut self, slot: StagingSlot, installation: Installation) -> Vec<Installation> {
        let id = installation.id().to_string();
        let mut superseded = Vec::new();
        if let Some(previous) = self.slot_mut(slot.other()).remove(&id) {
            superseded.push(previous);
        }
        if let Some(previous) = self.slot_mut(slot).insert(id, installation) {
            superseded.push(previous);
        }
        superseded
    }

    /// Remove a staged entry, returning it
    pub fn unstage(&mut self, slot: StagingSlot, id: &str) -> Option<Installation> {
        self.slot_mut(slot).remove(id)
    }

    /// Schedule a loaded plugin for removal; returns false if the host does not
    /// have it loaded (nothing is recorded then).
    pub fn mark_for_removal(&mut self, id: &str, host: &dyn PluginHost) -> bool {
        if !host.is_loaded(id) {
            return false;
        }
        self.removals.insert(id.to_string());
        true
    }

    /// Drop a pending removal; returns whether one existed
    pub fn clear_removal(&mut self, id: &str) -> bool {
        self.removals.remove(id)
    }

    pub fn is_pending_removal(&self, id: &str) -> bool {
        self.removals.contains(id)
    }

    /// IDs with a staged update, sorted
    pub fn pending_update_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.updates.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// IDs with a staged new install, sorted
    pub fn new_install_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.new_installs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// IDs pending removal, sorted
    pub fn pending_removal_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.removals.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn update_count(&self) -> usize {
        self.updates.len()
    }

    pub fn new_install_count(&self) -> usize {
        self.new_installs.len()
    }

    pub fn removal_count(&self) -> usize {
        self.removals.len()
    }

    /// Nothing staged and nothing pending removal
    pub fn is_empty(&self) -> bool {
        self.new_installs.is_empty() && self.updates.is_empty() && self.removals.is_empty()
    }
}
