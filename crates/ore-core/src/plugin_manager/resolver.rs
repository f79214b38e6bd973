//! Installation with recursive dependency resolution.
//!
//! Nested dependency installs report typed errors back to the parent, which
//! tolerates exactly two kinds: a dependency that is already installed (a
//! warning if its version differs) and a dependency the catalog does not know
//! (a warning). Every other failure of a dependency, including an unsupported
//! platform version, aborts the parent install. Dependencies staged before the
//! failure stay staged.
use futures::future::{BoxFuture, FutureExt};
use log::debug;

use crate::catalog::Dependency;

use super::client::OreClient;
use super::dependency::{unresolved_warning, version_mismatch_warning, DependencySet};
use super::error::{PluginManagerError, Result};
use super::ledger::StagingSlot;
use super::version::{check_platform_version, PlatformCheck};

impl OreClient {
    /// Install a plugin version, optionally pulling in its dependencies first.
    ///
    /// A plugin the host already has loaded gets its artifact staged as an
    /// update; anything else goes straight into the installation directory.
    /// Installing cancels a pending removal of the same plugin.
    ///
    /// `ignore_platform_check` only applies to the requested plugin; its
    /// dependencies are always checked against the host's API version.
    pub fn install_plugin<'a>(
        &'a mut self,
        id: &'a str,
        version: &'a str,
        resolve_dependencies: bool,
        ignore_platform_check: bool,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            self.check_not_installed(id)?;

            if self.in_progress.iter().any(|pending| pending == id) {
                debug!("{} is already being installed, skipping dependency cycle", id);
                return Ok(());
            }

            self.in_progress.push(id.to_string());
            let result = self
                .install_resolved(id, version, resolve_dependencies, ignore_platform_check)
                .await;
            self.in_progress.pop();
            result
        }
        .boxed()
    }

    async fn install_resolved(
        &mut self,
        id: &str,
        version: &str,
        resolve_dependencies: bool,
        ignore_platform_check: bool,
    ) -> Result<()> {
        let version = self.resolve_version(id, version).await?;

        if resolve_dependencies {
            self.notify("Finding dependencies...");
            self.resolve_dependencies(id, &version, ignore_platform_check).await?;
        }

        self.notify(&format!("Installing {} v{}...", id, version));
        let slot = StagingSlot::for_host(self.host.is_loaded(id));
        let installation = self.fetch_artifact(id, &version, &self.slot_dir(slot)).await?;
        self.stage_download(slot, installation).await
    }

    async fn resolve_dependencies(&mut self, id: &str, version: &str, ignore_platform_check: bool) -> Result<()> {
        let metadata = self
            .catalog
            .version(id, version)
            .await?
            .ok_or_else(|| PluginManagerError::PluginNotFound(id.to_string()))?;

        let dependencies = DependencySet::split(&metadata.dependencies, self.host.api_id());

        if !ignore_platform_check {
            if let Some(platform) = &dependencies.platform {
                self.check_platform(platform)?;
            }
        }

        for dependency in &dependencies.plugins {
            match self.install_plugin(&dependency.plugin_id, &dependency.version, true, false).await {
                Ok(()) => {}
                Err(PluginManagerError::PluginAlreadyInstalled(_)) => {
                    if let Some(installed) = self.installation(&dependency.plugin_id) {
                        if installed.version() != dependency.version {
                            self.warn(&version_mismatch_warning(dependency, installed.version()));
                        }
                    }
                }
                Err(PluginManagerError::PluginNotFound(_)) => {
                    self.warn(&unresolved_warning(dependency));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn check_platform(&self, platform: &Dependency) -> Result<()> {
        let current = self.host.api_version().ok_or_else(|| {
            PluginManagerError::InternalInconsistency("host did not report an API version".to_string())
        })?;

        match check_platform_version(&platform.version, &current)? {
            PlatformCheck::Compatible => {
                debug!("Platform requirement {} satisfied by {}", platform.version, current);
            }
            PlatformCheck::Skipped(warning) => self.warn(&warning),
        }
        Ok(())
    }
}
