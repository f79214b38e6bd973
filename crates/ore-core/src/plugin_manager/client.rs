use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::StreamExt;
use log::{debug, info, warn};
use tokio::io::AsyncWriteExt;

use crate::catalog::{ArtifactStream, CatalogClient, OreHttpCatalog, Project, User, RECOMMENDED_VERSION};
use crate::host::PluginHost;
use crate::storage::ClientConfig;
use crate::ui_bridge::{MessageSeverity, Messenger};
use crate::utils::remove_file_if_exists;

use super::error::{PluginManagerError, Result};
use super::installation::{Installation, LedgerState};
use super::ledger::{InstallationLedger, StagingSlot};
use super::placement::claim_available_path;
use super::scanner::{HostSourceScanner, MetadataScanner};

/// Client-side plugin manager driving installs, updates and uninstalls
/// against a remote catalog while the host keeps its plugins loaded.
///
/// Every mutating operation takes `&mut self`: a single owner serializes all
/// changes to the ledger. Nothing in the live installation directory that the
/// host holds open is touched until [`OreClient::apply_pending_updates`] or
/// [`OreClient::complete_uninstalls`] runs.
pub struct OreClient {
    pub(super) catalog: Arc<dyn CatalogClient>,
    pub(super) host: Arc<dyn PluginHost>,
    pub(super) scanner: Arc<dyn MetadataScanner>,
    messenger: Option<Arc<dyn Messenger>>,
    pub(super) installation_dir: PathBuf,
    pub(super) updates_dir: PathBuf,
    downloads_dir: PathBuf,
    pub(super) ignored_plugins: BTreeSet<String>,
    pub(super) ledger: InstallationLedger,
    // IDs whose install is underway further up the dependency chain
    pub(super) in_progress: Vec<String>,
}

impl fmt::Debug for OreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OreClient")
            .field("installation_dir", &self.installation_dir)
            .field("updates_dir", &self.updates_dir)
            .field("downloads_dir", &self.downloads_dir)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl OreClient {
    /// Create a client using the directories and ignore list of `config`
    pub fn new(config: &ClientConfig, catalog: Arc<dyn CatalogClient>, host: Arc<dyn PluginHost>) -> Self {
        let scanner: Arc<dyn MetadataScanner> = Arc::new(HostSourceScanner::new(host.clone()));
        Self {
            catalog,
            host,
            scanner,
            messenger: None,
            installation_dir: config.installation_directory.clone(),
            updates_dir: config.updates_directory.clone(),
            downloads_dir: config.downloads_directory.clone(),
            ignored_plugins: config.ignored_plugins.clone(),
            ledger: InstallationLedger::new(),
            in_progress: Vec::new(),
        }
    }

    /// Create a client talking to the repository configured in `config`
    pub fn from_config(config: &ClientConfig, host: Arc<dyn PluginHost>) -> Result<Self> {
        let catalog = OreHttpCatalog::with_timeout(&config.repository_url, config.request_timeout())?;
        Ok(Self::new(config, Arc::new(catalog), host))
    }

    /// Replace the scanner used to find installed artifacts when applying updates
    pub fn with_scanner(mut self, scanner: Arc<dyn MetadataScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn set_messenger(&mut self, messenger: Option<Arc<dyn Messenger>>) {
        self.messenger = messenger;
    }

    pub fn installation_dir(&self) -> &Path {
        &self.installation_dir
    }

    pub fn updates_dir(&self) -> &Path {
        &self.updates_dir
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub fn ledger(&self) -> &InstallationLedger {
        &self.ledger
    }

    pub fn host(&self) -> &dyn PluginHost {
        self.host.as_ref()
    }

    /// Whether the plugin counts as installed (loaded and kept, or staged as a new install)
    pub fn is_installed(&self, id: &str) -> bool {
        self.ledger.is_installed(id, self.host.as_ref())
    }

    /// The installation of an installed plugin; a staged update shadows the loaded version
    pub fn installation(&self, id: &str) -> Option<Installation> {
        self.ledger.installation(id, self.host.as_ref())
    }

    pub fn ledger_state(&self, id: &str) -> LedgerState {
        self.ledger.state(id, self.host.as_ref())
    }

    pub async fn project(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.catalog.project(id).await?)
    }

    pub async fn user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.catalog.user(username).await?)
    }

    pub async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        Ok(self.catalog.search_projects(query).await?)
    }

    /// Download a version into the downloads directory without installing it.
    ///
    /// Returns the path the artifact was saved to.
    pub async fn download_plugin(&self, id: &str, version: &str) -> Result<PathBuf> {
        let version = self.resolve_version(id, version).await?;
        self.notify(&format!("Downloading {} v{}...", id, version));
        let installation = self.fetch_artifact(id, &version, &self.downloads_dir).await?;
        Ok(installation.path().to_path_buf())
    }

    /// Schedule a plugin for removal.
    ///
    /// A loaded plugin is only marked; its file goes away in
    /// [`OreClient::complete_uninstalls`]. A plugin that is merely staged is
    /// discarded right away. Any staged update is discarded in both cases.
    pub async fn uninstall_plugin(&mut self, id: &str) -> Result<()> {
        self.check_installed(id)?;

        if let Some(update) = self.ledger.staged(StagingSlot::Update, id).cloned() {
            self.discard_artifact(&update).await?;
            self.ledger.unstage(StagingSlot::Update, id);
        }

        if self.ledger.mark_for_removal(id, self.host.as_ref()) {
            self.notify(&format!("{} will be removed on the next restart.", id));
        } else if let Some(install) = self.ledger.staged(StagingSlot::NewInstall, id).cloned() {
            self.discard_artifact(&install).await?;
            self.ledger.unstage(StagingSlot::NewInstall, id);
            self.notify(&format!("Discarded pending installation of {}.", install));
        }

        Ok(())
    }

    /// Number of staged updates not yet applied
    pub fn uninstalled_update_count(&self) -> usize {
        self.ledger.update_count()
    }

    pub fn has_uninstalled_updates(&self) -> bool {
        self.uninstalled_update_count() > 0
    }

    /// Number of loaded plugins scheduled for removal
    pub fn pending_uninstall_count(&self) -> usize {
        self.ledger.removal_count()
    }

    pub fn has_pending_uninstalls(&self) -> bool {
        self.pending_uninstall_count() > 0
    }

    /// Turn the "recommended" token into the project's current recommended version
    pub(super) async fn resolve_version(&self, id: &str, version: &str) -> Result<String> {
        if version != RECOMMENDED_VERSION {
            return Ok(version.to_string());
        }

        let project = self
            .catalog
            .project(id)
            .await?
            .ok_or_else(|| PluginManagerError::PluginNotFound(id.to_string()))?;
        debug!("Recommended version of {} is {}", id, project.recommended_version.name);
        Ok(project.recommended_version.name)
    }

    pub(super) fn slot_dir(&self, slot: StagingSlot) -> PathBuf {
        match slot {
            StagingSlot::NewInstall => self.installation_dir.clone(),
            StagingSlot::Update => self.updates_dir.clone(),
        }
    }

    /// Stream an artifact into a freshly claimed file in `dir`.
    ///
    /// A failed transfer deletes the partial file.
    pub(super) async fn fetch_artifact(&self, id: &str, version: &str, dir: &Path) -> Result<Installation> {
        let download = self
            .catalog
            .download(id, version)
            .await?
            .ok_or_else(|| PluginManagerError::PluginNotFound(id.to_string()))?;

        let (path, mut file) = claim_available_path(dir, &download.file_name)
            .await
            .map_err(|e| PluginManagerError::io(e, "claim artifact path", dir.to_path_buf()))?;
        debug!("Writing {} v{} to {}", id, version, path.display());

        if let Err(e) = write_artifact(&mut file, download.body).await {
            drop(file);
            if let Err(cleanup) = remove_file_if_exists(&path).await {
                warn!("Failed to remove partial download {}: {}", path.display(), cleanup);
            }
            return Err(PluginManagerError::io(e, "write artifact", path));
        }

        Ok(Installation::new(id, version, path))
    }

    /// Record a fully written artifact in its slot and delete whatever it supersedes.
    ///
    /// Staging cancels a pending removal of the same ID.
    pub(super) async fn stage_download(&mut self, slot: StagingSlot, installation: Installation) -> Result<()> {
        let id = installation.id().to_string();
        info!("Staged {} as {:?}", installation, slot);
        let superseded = self.ledger.stage(slot, installation);
        if self.ledger.clear_removal(&id) {
            debug!("Pending removal of {} cancelled", id);
        }
        for previous in superseded {
            self.discard_artifact(&previous).await?;
        }
        Ok(())
    }

    pub(super) async fn discard_artifact(&self, installation: &Installation) -> Result<()> {
        let removed = remove_file_if_exists(installation.path())
            .await
            .map_err(|e| PluginManagerError::io(e, "delete artifact", installation.path().to_path_buf()))?;
        if !removed {
            debug!("Artifact {} was already gone", installation.path().display());
        }
        Ok(())
    }

    pub(super) fn check_installed(&self, id: &str) -> Result<()> {
        if !self.is_installed(id) {
            return Err(PluginManagerError::PluginNotInstalled(id.to_string()));
        }
        Ok(())
    }

    pub(super) fn check_not_installed(&self, id: &str) -> Result<()> {
        if self.is_installed(id) {
            return Err(PluginManagerError::PluginAlreadyInstalled(id.to_string()));
        }
        Ok(())
    }

    pub(super) fn notify(&self, message: &str) {
        info!("{}", message);
        if let Some(messenger) = &self.messenger {
            messenger.deliver_message(MessageSeverity::Info, message);
        }
    }

    pub(super) fn warn(&self, message: &str) {
        warn!("{}", message);
        if let Some(messenger) = &self.messenger {
            messenger.deliver_message(MessageSeverity::Warning, message);
        }
    }
}

async fn write_artifact(file: &mut tokio::fs::File, mut body: ArtifactStream) -> std::io::Result<()> {
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await
}
