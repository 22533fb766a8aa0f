//! Cloudflare API error types

use thiserror::Error;

/// Result type for Cloudflare API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// How a Cloudflare API call can fail.
///
/// The three variants keep "could not reach the API", "reached it but
/// the answer was not the envelope", and "the API rejected the request"
/// distinguishable, because callers word their messages differently for
/// each.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Invalid JSON response from Cloudflare API: {0}")]
    InvalidResponse(String),

    /// Envelope with `success: false`; carries the first reported error
    /// as `"<code> <message>"`, or a generic text when none was given
    #[error("{0}")]
    Rejected(String),
}
