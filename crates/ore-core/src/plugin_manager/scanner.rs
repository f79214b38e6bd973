use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::host::PluginHost;
use crate::utils::{find_files, find_files_with_extension};

use super::error::{PluginManagerError, Result};

/// Plugin declared inside an artifact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub id: String,
    pub version: Option<String>,
}

/// Reads which plugins the artifact files of a directory declare.
///
/// Used to find the file holding the currently installed copy of a plugin when
/// an update replaces it.
#[async_trait]
pub trait MetadataScanner: Send + Sync {
    async fn scan(&self, dir: &Path) -> Result<HashMap<PathBuf, Vec<PluginMetadata>>>;
}

/// Scanner attributing each file to the host plugins that were loaded from it
pub struct HostSourceScanner {
    host: Arc<dyn PluginHost>,
    extension: Option<String>,
}

impl HostSourceScanner {
    pub fn new(host: Arc<dyn PluginHost>) -> Self {
        Self { host, extension: None }
    }

    /// Only consider files with the given extension
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }
}

fn comparable(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[async_trait]
impl MetadataScanner for HostSourceScanner {
    async fn scan(&self, dir: &Path) -> Result<HashMap<PathBuf, Vec<PluginMetadata>>> {
        let root = dir.to_path_buf();
        let extension = self.extension.clone();
        let files = tokio::task::spawn_blocking(move || match extension {
            Some(ext) => find_files_with_extension(&root, &ext),
            None => find_files(&root, &|_: &Path| true),
        })
        .await
        .map_err(io::Error::other)
        .and_then(|listed| listed)
        .map_err(|e| PluginManagerError::io(e, "scan", dir.to_path_buf()))?;

        let sources: Vec<(PathBuf, PluginMetadata)> = self
            .host
            .loaded_plugins()
            .into_iter()
            .map(|plugin| {
                (
                    comparable(&plugin.source),
                    PluginMetadata {
                        id: plugin.id,
                        version: plugin.version,
                    },
                )
            })
            .collect();

        let mut result = HashMap::new();
        for file in files {
            let key = comparable(&file);
            let declared: Vec<PluginMetadata> = sources
                .iter()
                .filter(|(source, _)| *source == key)
                .map(|(_, metadata)| metadata.clone())
                .collect();
            debug!("Scanned {}: {} plugin(s)", file.display(), declared.len());
            result.insert(file, declared);
        }

        Ok(result)
    }
}
