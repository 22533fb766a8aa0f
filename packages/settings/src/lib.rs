// ABOUTME: Edgecron settings library providing the persisted configuration blob
// ABOUTME: Typed settings, credential state, and pluggable TOML/in-memory stores

pub mod error;
pub mod store;
pub mod types;

// Re-export main types
pub use error::{SettingsError, SettingsResult};
pub use store::{FileStore, MemoryStore, SettingsStore};
pub use types::{Credential, OAuthSettings, PendingAuthorization, Settings};
