// ABOUTME: OAuth module providing the Cloudflare authorization-code flow
// ABOUTME: Includes the manager, callback server, probe diagnostics, and grant types

pub mod manager;
pub mod probe;
pub mod server;
pub mod types;

pub use manager::OAuthManager;
pub use probe::ProbeCheck;
pub use server::CallbackServer;
pub use types::{CallbackParams, TokenGrant};
