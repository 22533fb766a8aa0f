// ABOUTME: Edgecron authentication library providing the Cloudflare OAuth flow
// ABOUTME: Authorization-code grant, token refresh, disconnect, and endpoint diagnostics

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use oauth::{CallbackParams, CallbackServer, OAuthManager, ProbeCheck, TokenGrant};
