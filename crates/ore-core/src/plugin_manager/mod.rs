//! # Ore Plugin Manager
//!
//! The transaction engine behind install, update and uninstall requests. It
//! reconciles what the host currently has loaded with what the user asked for,
//! and defers every change to a loaded plugin's artifact until a safe point.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`client`]**: [`OreClient`], the public surface driven by a CLI or UI.
//! - **[`ledger`]**: [`InstallationLedger`], staged installs, staged updates and
//!   pending removals, with the `is_installed` predicate everything derives from.
//! - **[`resolver`]**: Recursive installation with dependency resolution.
//! - **[`version`]**: Platform API compatibility check.
//! - **[`placement`]**: Collision-safe artifact placement.
//! - **[`applier`]**: Applying staged updates and completing removals.
//! - **[`updates`]**: Comparing loaded plugins with the catalog's recommendations.
//! - **[`scanner`]**: Finding which artifact file declares which plugin.
//! - **[`error`]**: [`PluginManagerError`].
//!
//! A plugin ID is staged in at most one slot: a plugin the host has loaded can
//! only receive a staged update, anything else a staged new install. A removal
//! can only be pending for a loaded plugin.
pub mod applier;
pub mod client;
pub mod dependency;
pub mod error;
pub mod installation;
pub mod ledger;
pub mod placement;
pub mod resolver;
pub mod scanner;
pub mod updates;
pub mod version;

pub use applier::AppliedChanges;
pub use client::OreClient;
pub use dependency::DependencySet;
pub use error::{PluginManagerError, Result};
pub use installation::{Installation, LedgerState};
pub use ledger::{InstallationLedger, StagingSlot};
pub use scanner::{HostSourceScanner, MetadataScanner, PluginMetadata};
pub use updates::AvailableUpdate;
pub use version::{check_platform_version, PlatformCheck};

#[cfg(test)]
mod tests;
