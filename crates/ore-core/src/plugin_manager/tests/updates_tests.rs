#![cfg(test)]

use super::common::{file_names, path_of, TestEnv};
use crate::plugin_manager::{AvailableUpdate, LedgerState, PluginManagerError, StagingSlot};

#[tokio::test]
async fn test_available_updates_lists_outdated_loaded_plugins() {
    let mut env = TestEnv::new();
    env.catalog.publish("nucleus", "2.0", &[]);
    env.catalog.publish("luckperms", "4.0", &[]);
    env.catalog.publish("worldedit", "7.0", &[]);
    env.config.ignored_plugins.insert("worldedit".to_string());
    let client = env.client(env.host(&[
        ("nucleus", "1.0"),
        ("luckperms", "4.0"),
        ("worldedit", "6.0"),
        ("homegrown", "0.1"),
    ]));

    let updates = client.available_updates().await.unwrap();

    assert_eq!(
        updates,
        vec![AvailableUpdate {
            id: "nucleus".to_string(),
            installed_version: Some("1.0".to_string()),
            recommended_version: "2.0".to_string(),
        }]
    );
    assert_eq!(updates[0].to_string(), "nucleus: v1.0 -> v2.0");
}

#[tokio::test]
async fn test_is_update_available() {
    let env = TestEnv::new();
    env.catalog.publish("nucleus", "2.0", &[]);
    env.catalog.publish("luckperms", "4.0", &[]);
    let client = env.client(env.host(&[("nucleus", "1.0"), ("luckperms", "4.0"), ("homegrown", "0.1")]));

    assert!(client.is_update_available("nucleus").await.unwrap());
    assert!(!client.is_update_available("luckperms").await.unwrap());
    assert!(!client.is_update_available("homegrown").await.unwrap());
    assert!(matches!(
        client.is_update_available("ghost").await,
        Err(PluginManagerError::PluginNotInstalled(_))
    ));
}

#[tokio::test]
async fn test_staged_update_counts_as_current_version() {
    let env = TestEnv::new();
    env.catalog.publish("nucleus", "2.0", &[]);
    let mut client = env.client(env.host(&[("nucleus", "1.0")]));

    client.update_plugin("nucleus", "recommended").await.unwrap();

    assert!(!client.is_update_available("nucleus").await.unwrap());
    let result = client.update_plugin("nucleus", "recommended").await;
    assert!(matches!(result, Err(PluginManagerError::NoUpdateAvailable(id)) if id == "nucleus"));
    assert_eq!(client.uninstalled_update_count(), 1);
}

#[tokio::test]
async fn test_update_requires_installed_plugin() {
    let env = TestEnv::new();
    env.catalog.publish("nucleus", "2.0", &[]);
    let mut client = env.client(env.host(&[]));

    let result = client.update_plugin("nucleus", "2.0").await;
    assert!(matches!(result, Err(PluginManagerError::PluginNotInstalled(_))));
    assert!(file_names(env.updates()).is_empty());
}

#[tokio::test]
async fn test_update_to_explicit_version_replaces_staged_update() {
    let env = TestEnv::new();
    env.catalog.publish("nucleus", "2.0", &[]);
    env.catalog.publish("nucleus", "2.1", &[]);
    let mut client = env.client(env.host(&[("nucleus", "1.0")]));

    client.update_plugin("nucleus", "2.0").await.unwrap();
    client.update_plugin("nucleus", "2.1").await.unwrap();

    assert_eq!(file_names(env.updates()), vec!["nucleus-2.1.jar"]);
    assert!(matches!(
        client.ledger_state("nucleus"),
        LedgerState::StagedUpdate { installation } if installation.version() == "2.1"
    ));
}

#[tokio::test]
async fn test_update_of_staged_install_stays_in_install_slot() {
    let env = TestEnv::new();
    env.catalog.publish("worldedit", "7.0", &[]);
    env.catalog.publish("worldedit", "7.1", &[]);
    let mut client = env.client(env.host(&[]));
    client.install_plugin("worldedit", "7.0", false, false).await.unwrap();

    client.update_plugin("worldedit", "7.1").await.unwrap();

    assert!(client.ledger().staged(StagingSlot::Update, "worldedit").is_none());
    assert_eq!(path_of(&client, "worldedit"), env.mods().join("worldedit-7.1.jar"));
    assert_eq!(file_names(env.mods()), vec!["worldedit-7.1.jar"]);
    assert!(!client.has_uninstalled_updates());
}
