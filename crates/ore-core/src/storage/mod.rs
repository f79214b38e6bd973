//! # Ore Client Storage
//!
//! Configuration of the client: where the live plugin directory and the
//! staging directories live, which catalog to talk to, and which plugins to
//! leave out of update checks.
//!
//! - **[`config`]**: [`ClientConfig`] and the [`ConfigFormat`] file formats.
//! - **[`error`]**: [`StorageSystemError`], I/O and (de)serialization failures.
pub mod config;
pub mod error;

pub use config::{ClientConfig, ConfigFormat};
pub use error::StorageSystemError;
