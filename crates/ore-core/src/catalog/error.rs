//! # Ore Catalog Errors
//!
//! Defines [`CatalogError`], the failures that can occur while talking to the
//! remote catalog. "Not found" is deliberately absent: lookups report it as
//! `Ok(None)`.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to '{url}' timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog answered HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    #[error("Failed to decode catalog response from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Shorthand for Result with [`CatalogError`]
pub type Result<T> = std::result::Result<T, CatalogError>;
