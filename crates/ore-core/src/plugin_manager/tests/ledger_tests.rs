#![cfg(test)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::host::{HostSnapshot, LoadedPlugin, PluginHost};
use crate::plugin_manager::{Installation, InstallationLedger, LedgerState, StagingSlot};

fn host_with(ids: &[&str]) -> HostSnapshot {
    let mut host = HostSnapshot::new(Some("7.5.0"));
    for id in ids {
        host.insert(LoadedPlugin::new(id, Some("1.0"), format!("/mods/{}.jar", id)));
    }
    host
}

fn staged(id: &str, version: &str, dir: &str) -> Installation {
    Installation::new(id, version, format!("/{}/{}-{}.jar", dir, id, version))
}

#[test]
fn test_empty_ledger_reports_host_plugins() {
    let ledger = InstallationLedger::new();
    let host = host_with(&["nucleus"]);

    assert!(ledger.is_installed("nucleus", &host));
    assert!(!ledger.is_installed("worldedit", &host));
    assert_eq!(ledger.state("nucleus", &host), LedgerState::LoadedActive);
    assert_eq!(ledger.state("worldedit", &host), LedgerState::NotInstalled);

    let installation = ledger.installation("nucleus", &host).expect("loaded plugin is installed");
    assert_eq!(installation.version(), "1.0");
    assert_eq!(installation.path(), std::path::Path::new("/mods/nucleus.jar"));
    assert!(ledger.is_empty());
}

#[test]
fn test_staged_update_shadows_loaded_version() {
    let mut ledger = InstallationLedger::new();
    let host = host_with(&["nucleus"]);

    let superseded = ledger.stage(StagingSlot::Update, staged("nucleus", "2.0", "updates"));
    assert!(superseded.is_empty());

    let installation = ledger.installation("nucleus", &host).unwrap();
    assert_eq!(installation.version(), "2.0");
    assert!(matches!(ledger.state("nucleus", &host), LedgerState::StagedUpdate { .. }));
    assert_eq!(ledger.pending_update_ids(), vec!["nucleus".to_string()]);
}

#[test]
fn test_new_install_counts_as_installed_only_when_not_loaded() {
    let mut ledger = InstallationLedger::new();
    let host = host_with(&[]);

    ledger.stage(StagingSlot::NewInstall, staged("worldedit", "7.0", "mods"));
    assert!(ledger.is_installed("worldedit", &host));
    assert_eq!(ledger.installation("worldedit", &host).unwrap().version(), "7.0");
    assert_eq!(ledger.new_install_ids(), vec!["worldedit".to_string()]);
}

#[test]
fn test_restaging_returns_superseded_entries() {
    let mut ledger = InstallationLedger::new();

    ledger.stage(StagingSlot::Update, staged("a", "1", "updates"));
    let superseded = ledger.stage(StagingSlot::Update, staged("a", "2", "updates"));
    assert_eq!(superseded, vec![staged("a", "1", "updates")]);

    // Moving to the other slot evicts the first entry too
    let superseded = ledger.stage(StagingSlot::NewInstall, staged("a", "3", "mods"));
    assert_eq!(superseded, vec![staged("a", "2", "updates")]);
    assert!(ledger.staged(StagingSlot::Update, "a").is_none());
    assert_eq!(ledger.staged(StagingSlot::NewInstall, "a").unwrap().version(), "3");
}

#[test]
fn test_removal_requires_loaded_plugin() {
    let mut ledger = InstallationLedger::new();
    let host = host_with(&["loaded"]);

    assert!(!ledger.mark_for_removal("staged-only", &host));
    assert!(!ledger.is_pending_removal("staged-only"));

    assert!(ledger.mark_for_removal("loaded", &host));
    assert!(!ledger.is_installed("loaded", &host));
    assert!(ledger.installation("loaded", &host).is_none());
    assert_eq!(ledger.state("loaded", &host), LedgerState::LoadedPendingRemoval);
    assert_eq!(ledger.removal_count(), 1);

    assert!(ledger.clear_removal("loaded"));
    assert!(ledger.is_installed("loaded", &host));
    assert!(!ledger.clear_removal("loaded"));
}

#[test]
fn test_staged_new_install_ignored_once_host_loads_plugin() {
    let mut ledger = InstallationLedger::new();
    let mut host = host_with(&[]);

    ledger.stage(StagingSlot::NewInstall, staged("a", "1", "mods"));
    host.insert(LoadedPlugin::new("a", Some("1"), "/mods/a-1.jar"));
    ledger.mark_for_removal("a", &host);

    // Loaded and pending removal: the staged new install no longer counts
    assert!(!ledger.is_installed("a", &host));
}

#[test]
fn test_random_interleavings_keep_invariants() {
    const IDS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut host = host_with(&["alpha", "beta"]);
    let mut ledger = InstallationLedger::new();

    for step in 0..2_000 {
        let id = IDS[rng.gen_range(0..IDS.len())];
        match rng.gen_range(0..5) {
            // install / update: stage in the slot chosen by host status
            0 | 1 => {
                let slot = StagingSlot::for_host(host.is_loaded(id));
                let dir = if slot == StagingSlot::Update { "updates" } else { "mods" };
                ledger.stage(slot, staged(id, &step.to_string(), dir));
                ledger.clear_removal(id);
            }
            // uninstall
            2 => {
                ledger.unstage(StagingSlot::Update, id);
                if !ledger.mark_for_removal(id, &host) {
                    ledger.unstage(StagingSlot::NewInstall, id);
                }
            }
            // host restart picks up a staged new install
            3 => {
                if let Some(install) = ledger.unstage(StagingSlot::NewInstall, id) {
                    host.insert(LoadedPlugin::new(id, Some(install.version()), install.path()));
                }
            }
            // host unloads a plugin that is not pending removal
            _ => {
                if !ledger.is_pending_removal(id) && ledger.staged(StagingSlot::Update, id).is_none() {
                    host.remove(id);
                }
            }
        }

        for id in IDS {
            let loaded = host.is_loaded(id);
            let pending_removal = ledger.is_pending_removal(id);
            let new_install = ledger.staged(StagingSlot::NewInstall, id).is_some();
            let update = ledger.staged(StagingSlot::Update, id).is_some();

            assert!(!(new_install && update), "{} staged in both slots at step {}", id, step);
            assert!(!pending_removal || loaded, "{} pending removal while unloaded at step {}", id, step);
            assert_eq!(
                ledger.is_installed(id, &host),
                (loaded && !pending_removal) || (!loaded && new_install),
                "installed predicate broken for {} at step {}",
                id,
                step
            );
            assert_eq!(ledger.installation(id, &host).is_some(), ledger.is_installed(id, &host));
            assert_eq!(ledger.state(id, &host).is_installed(), ledger.is_installed(id, &host));
        }
    }
}
