// ABOUTME: Error types for the Cloudflare OAuth credential lifecycle
// ABOUTME: Keeps configuration, transport, protocol, and provider failures distinguishable

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// A required local setting is absent or malformed; nothing was sent
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The authorization server reported a failure of its own
    #[error("Provider error: {0}")]
    Provider(String),

    /// The returned state did not match the stored single-use state
    #[error("OAuth state validation failed. Try connecting again")]
    StateMismatch,

    #[error("OAuth callback is missing the authorization code")]
    MissingCode,

    /// The token endpoint could not be reached
    #[error("Token request failed: {0}")]
    Transport(String),

    /// The token endpoint answered with something other than a JSON object
    #[error("Invalid response from OAuth token endpoint: {0}")]
    InvalidResponse(String),

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Settings error: {0}")]
    Settings(#[from] edgecron_settings::SettingsError),
}
