//! Cloudflare v4 API client for edgecron provisioning
//!
//! A small facade over the handful of endpoints auto-setup touches:
//! token verification, zone lookup, Worker script upload, script
//! secrets, cron schedules, and zone routes. Responses are classified
//! by the v4 JSON envelope, never by HTTP status.

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use types::{WorkerRoute, Zone, ZoneAccount};

/// Production API base; tests point the client elsewhere
pub const API_BASE: &str = "https://api.cloudflare.com/client/v4";
