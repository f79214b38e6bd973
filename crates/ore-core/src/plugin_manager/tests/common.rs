#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tempfile::{tempdir, TempDir};

use crate::catalog::{self, ArtifactDownload, CatalogClient, Dependency, Project, User, Version};
use crate::host::{HostSnapshot, LoadedPlugin, DEFAULT_API_ID};
use crate::plugin_manager::OreClient;
use crate::storage::ClientConfig;
use crate::ui_bridge::BufferedMessenger;

/// Host API version every test host reports
pub const HOST_API_VERSION: &str = "7.5.0";

/// In-memory catalog. Publishing the first version of a project makes it the
/// recommended one.
#[derive(Default)]
pub struct MockCatalog {
    projects: Mutex<HashMap<String, Project>>,
    versions: Mutex<HashMap<(String, String), Version>>,
    failing: Mutex<HashSet<String>>,
    downloads: Mutex<Vec<(String, String)>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, id: &str, version: &str, dependencies: &[(&str, &str)]) {
        let dependencies = dependencies
            .iter()
            .map(|(plugin_id, required)| Dependency::new(plugin_id, required))
            .collect();
        let metadata = Version::new(version).with_dependencies(dependencies);

        self.projects
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_insert_with(|| Project::new(id, id, metadata.clone()));
        self.versions
            .lock()
            .unwrap()
            .insert((id.to_string(), version.to_string()), metadata);
    }

    pub fn recommend(&self, id: &str, version: &str) {
        let metadata = self
            .versions
            .lock()
            .unwrap()
            .get(&(id.to_string(), version.to_string()))
            .cloned()
            .expect("version must be published first");
        if let Some(project) = self.projects.lock().unwrap().get_mut(id) {
            project.recommended_version = metadata;
        }
    }

    /// Make every download of `id` break off after the first chunk
    pub fn fail_downloads_of(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn downloads(&self) -> Vec<(String, String)> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn project(&self, id: &str) -> catalog::Result<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(id).cloned())
    }

    async fn version(&self, id: &str, version: &str) -> catalog::Result<Option<Version>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .get(&(id.to_string(), version.to_string()))
            .cloned())
    }

    async fn search_projects(&self, query: &str) -> catalog::Result<Vec<Project>> {
        let mut found: Vec<Project> = self
            .projects
            .lock()
            .unwrap()
            .values()
            .filter(|project| project.plugin_id.contains(query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.plugin_id.cmp(&b.plugin_id));
        Ok(found)
    }

    async fn user(&self, _username: &str) -> catalog::Result<Option<User>> {
        Ok(None)
    }

    async fn download(&self, id: &str, version: &str) -> catalog::Result<Option<ArtifactDownload>> {
        if !self
            .versions
            .lock()
            .unwrap()
            .contains_key(&(id.to_string(), version.to_string()))
        {
            return Ok(None);
        }
        self.downloads
            .lock()
            .unwrap()
            .push((id.to_string(), version.to_string()));

        let file_name = format!("{}-{}.jar", id, version);
        if self.failing.lock().unwrap().contains(id) {
            let body = stream::iter(vec![
                Ok(b"partial".to_vec()),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            ])
            .boxed();
            return Ok(Some(ArtifactDownload::new(file_name, body)));
        }

        Ok(Some(ArtifactDownload::from_bytes(
            file_name,
            format!("{} {}", id, version).into_bytes(),
        )))
    }
}

/// A temporary server root with `mods`, `updates` and `downloads` directories
pub struct TestEnv {
    pub dir: TempDir,
    pub config: ClientConfig,
    pub catalog: Arc<MockCatalog>,
    pub messenger: Arc<BufferedMessenger>,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        let config = ClientConfig::rooted_at(dir.path());
        Self {
            dir,
            config,
            catalog: Arc::new(MockCatalog::new()),
            messenger: Arc::new(BufferedMessenger::new()),
        }
    }

    pub fn mods(&self) -> &Path {
        &self.config.installation_directory
    }

    pub fn updates(&self) -> &Path {
        &self.config.updates_directory
    }

    /// Host with the given `(id, version)` plugins loaded, each from its own
    /// file `mods/<id>.jar`
    pub fn host(&self, loaded: &[(&str, &str)]) -> HostSnapshot {
        fs::create_dir_all(self.mods()).expect("create mods dir");
        let mut host = HostSnapshot::new(Some(HOST_API_VERSION));
        for (id, version) in loaded {
            let source = self.mods().join(format!("{}.jar", id));
            fs::write(&source, format!("{} {}", id, version)).expect("write loaded artifact");
            host.insert(LoadedPlugin::new(id, Some(version), source));
        }
        host
    }

    pub fn client(&self, host: HostSnapshot) -> OreClient {
        OreClient::new(&self.config, self.catalog.clone(), Arc::new(host)).with_messenger(self.messenger.clone())
    }
}

/// Sorted file names of a directory; empty if it does not exist
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

pub fn platform(version: &str) -> (&'static str, &str) {
    (DEFAULT_API_ID, version)
}

pub fn path_of(client: &OreClient, id: &str) -> PathBuf {
    client
        .installation(id)
        .map(|installation| installation.path().to_path_buf())
        .expect("plugin should be installed")
}
