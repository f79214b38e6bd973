pub mod catalog;
pub mod host;
pub mod plugin_manager;
pub mod storage;
pub mod ui_bridge;
pub mod utils;

// Re-export key public types/traits for easier use by the binary
pub use catalog::{CatalogClient, OreHttpCatalog, RECOMMENDED_VERSION};
pub use host::{HostSnapshot, LoadedPlugin, PluginHost};
pub use plugin_manager::{AppliedChanges, Installation, LedgerState, OreClient, PluginManagerError};
pub use storage::ClientConfig;
pub use ui_bridge::{MessageSeverity, Messenger};
