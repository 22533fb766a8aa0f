// ABOUTME: Error types for the auto-setup pipeline
// ABOUTME: One variant per abortable step so every failure renders its step-specific message

use thiserror::Error;

pub type SetupResult<T> = Result<T, SetupError>;

/// Why a setup run stopped. Each variant is the terminal message of the
/// step it names; nothing after a failed step runs.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("No Cloudflare credential found. Connect OAuth or configure an API token first")]
    MissingCredential,

    #[error("Cloudflare OAuth refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Cloudflare API client error: {0}")]
    Client(String),

    #[error("Cloudflare token verification failed: {0}")]
    VerificationFailed(String),

    #[error("Could not determine the site hostname. Set site_url to the full site address first")]
    MissingHost,

    #[error("Failed to fetch zones: {0}")]
    ZoneListing(String),

    #[error("No matching Cloudflare zone found for host: {0}")]
    NoZone(String),

    #[error("Cloudflare zone/account ID missing in API response")]
    IncompleteZone,

    #[error("Worker upload failed: {0}")]
    Upload(String),

    #[error("Failed to save {name} secret: {message}")]
    Secret { name: String, message: String },

    #[error("Failed to set cron trigger: {0}")]
    Schedule(String),

    #[error("Failed to set worker route: {0}")]
    Route(String),

    #[error("Settings error: {0}")]
    Settings(#[from] edgecron_settings::SettingsError),
}
