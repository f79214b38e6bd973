//! # Ore Catalog
//!
//! Client-side access to the remote plugin catalog: project listings, version
//! metadata (including declared dependencies), user profiles and artifact
//! downloads.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`model`]**: Serde models for catalog responses ([`Project`], [`Version`],
//!   [`Dependency`], [`User`]).
//! - **[`http`]**: [`OreHttpCatalog`], the reqwest-backed [`CatalogClient`].
//! - **[`routes`]**: Path segments of the catalog's REST endpoints.
//! - **[`error`]**: [`CatalogError`], transport and decoding failures.
//!
//! Absence is never an error here: every lookup returns `Ok(None)` when the
//! catalog answers 404, so callers can tell "this plugin/version does not
//! exist" apart from a broken connection.
pub mod error;
pub mod http;
pub mod model;
pub mod routes;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

pub use error::{CatalogError, Result};
pub use http::OreHttpCatalog;
pub use model::{Category, Channel, Dependency, Project, User, Version};

/// Version token resolved to the project's recommended version at call time.
pub const RECOMMENDED_VERSION: &str = "recommended";

/// Extension assumed for artifacts whose download does not name a file.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "jar";

/// Byte stream of an artifact being downloaded.
pub type ArtifactStream = BoxStream<'static, std::io::Result<Vec<u8>>>;

/// An opened artifact download.
pub struct ArtifactDownload {
    /// File name without its extension, used as the base for collision-safe placement
    pub name: String,
    /// File name advertised by the catalog (e.g. `Foo-1.2.jar`)
    pub file_name: String,
    /// Artifact contents
    pub body: ArtifactStream,
}

impl ArtifactDownload {
    /// Create a download for the given file name, deriving the base name from it.
    pub fn new(file_name: impl Into<String>, body: ArtifactStream) -> Self {
        let file_name = file_name.into();
        let name = Path::new(&file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        Self { name, file_name, body }
    }

    /// Create a download whose body is already held in memory.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(file_name, stream::iter(vec![Ok(bytes)]).boxed())
    }
}

impl fmt::Debug for ArtifactDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactDownload")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Remote catalog of installable plugins.
///
/// Every lookup returns `Ok(None)` when the catalog reports the resource as
/// missing; `Err` is reserved for transport and decoding failures.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up a project by plugin ID.
    async fn project(&self, id: &str) -> Result<Option<Project>>;

    /// Look up the metadata of a concrete version of a project.
    async fn version(&self, id: &str, version: &str) -> Result<Option<Version>>;

    /// Search projects matching a free-text query.
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>>;

    /// Look up a user by name.
    async fn user(&self, username: &str) -> Result<Option<User>>;

    /// Open the artifact download of a version.
    async fn download(&self, id: &str, version: &str) -> Result<Option<ArtifactDownload>>;
}
