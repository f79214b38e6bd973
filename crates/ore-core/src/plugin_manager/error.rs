//! # Ore Plugin Manager Errors
//!
//! Defines [`PluginManagerError`], the failures of install, update, uninstall
//! and apply operations.
//!
//! The first five variants are expected, user-recoverable conditions and are
//! returned to the caller as-is. [`PluginManagerError::InternalInconsistency`]
//! means the host reported something impossible (e.g. a malformed API
//! version); it is never downgraded to a warning.
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum PluginManagerError {
    #[error("Plugin not found in catalog: {0}")]
    PluginNotFound(String),

    #[error("Plugin already installed: {0}")]
    PluginAlreadyInstalled(String),

    #[error("Plugin not installed: {0}")]
    PluginNotInstalled(String),

    #[error("No update available for plugin: {0}")]
    NoUpdateAvailable(String),

    #[error("Unsupported platform version: plugin requires API {required} but the host runs {current}")]
    UnsupportedPlatformVersion { required: String, current: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl PluginManagerError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PluginManagerError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    /// Whether this error describes a request the user can correct
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PluginManagerError::PluginNotFound(_)
                | PluginManagerError::PluginAlreadyInstalled(_)
                | PluginManagerError::PluginNotInstalled(_)
                | PluginManagerError::NoUpdateAvailable(_)
                | PluginManagerError::UnsupportedPlatformVersion { .. }
        )
    }
}

/// Shorthand for Result with [`PluginManagerError`]
pub type Result<T> = std::result::Result<T, PluginManagerError>;
