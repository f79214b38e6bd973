//! HTTP implementation of [`CatalogClient`] backed by reqwest.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use log::debug;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::error::{CatalogError, Result};
use super::model::{Project, User, Version};
use super::{routes, ArtifactDownload, CatalogClient, DEFAULT_ARTIFACT_EXTENSION};

/// Default HTTP request timeout (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("ore-client/", env!("CARGO_PKG_VERSION"));

/// Catalog client talking to an Ore repository over HTTP.
///
/// Every request carries the configured timeout, so a hung connection fails
/// with [`CatalogError::Timeout`] instead of blocking the caller forever.
#[derive(Clone)]
pub struct OreHttpCatalog {
    client: Client,
    root: Url,
    timeout: Duration,
}

impl fmt::Debug for OreHttpCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OreHttpCatalog")
            .field("root", &self.root.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OreHttpCatalog {
    /// Create a client for the repository at `root_url` with the default timeout.
    pub fn new(root_url: &str) -> Result<Self> {
        Self::with_timeout(root_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client for the repository at `root_url` with a custom timeout.
    pub fn with_timeout(root_url: &str, timeout: Duration) -> Result<Self> {
        let root = Url::parse(root_url).map_err(|e| CatalogError::InvalidUrl {
            url: root_url.to_string(),
            message: e.to_string(),
        })?;
        if root.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl {
                url: root_url.to_string(),
                message: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self { client, root, timeout })
    }

    /// Root URL of the repository
    pub fn root_url(&self) -> &Url {
        &self.root
    }

    /// Request timeout applied to every call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build an endpoint URL from path segments; segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl {
                url: self.root.to_string(),
                message: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, url: &Url, source: reqwest::Error) -> CatalogError {
        if source.is_timeout() {
            CatalogError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            CatalogError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Issue a GET; `Ok(None)` on 404, error on any other non-success status.
    async fn send(&self, url: &Url) -> Result<Option<Response>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Some(response))
    }

    async fn get_model<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.send(&url).await? {
            Some(response) => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|source| CatalogError::Decode {
                    url: url.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CatalogClient for OreHttpCatalog {
    async fn project(&self, id: &str) -> Result<Option<Project>> {
        self.get_model(self.endpoint(&routes::project(id))?).await
    }

    async fn version(&self, id: &str, version: &str) -> Result<Option<Version>> {
        self.get_model(self.endpoint(&routes::version(id, version))?).await
    }

    async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        let mut url = self.endpoint(&routes::project_list())?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(self.get_model::<Vec<Project>>(url).await?.unwrap_or_default())
    }

    async fn user(&self, username: &str) -> Result<Option<User>> {
        self.get_model(self.endpoint(&routes::user(username))?).await
    }

    async fn download(&self, id: &str, version: &str) -> Result<Option<ArtifactDownload>> {
        let url = self.endpoint(&routes::download(id, version))?;
        let Some(response) = self.send(&url).await? else {
            return Ok(None);
        };

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| format!("{}-{}.{}", id, version, DEFAULT_ARTIFACT_EXTENSION));

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(std::io::Error::other))
            .boxed();

        Ok(Some(ArtifactDownload::new(file_name, body)))
    }
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// Only the final path component is kept so a hostile header cannot point
/// outside the target directory.
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"'))
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
