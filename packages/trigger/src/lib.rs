//! Timeout-bounded trigger for the wp-cron endpoint
//!
//! The host-side counterpart of the deployed Worker: one GET against
//! `/wp-cron.php` with the shared auth header, a hard deadline, and a
//! classification of what happened. [`TriggerClient::trigger`] never
//! returns an error; every fault becomes a [`TriggerOutcome`] so
//! scheduled runs and probes can share the exact same logic.

pub mod client;
pub mod outcome;

pub use client::{run_probe, run_scheduled, TriggerClient};
pub use outcome::TriggerOutcome;

use std::time::Duration;

/// Path of the cron runner on the target site
pub const CRON_ENDPOINT_PATH: &str = "/wp-cron.php";

/// Query marker that also defeats page caches
pub const CACHE_BUST_QUERY: &str = "doing_wp_cron";

/// Header carrying the shared secret
pub const AUTH_HEADER: &str = "X-Worker-Auth";

/// Fixed user agent so trigger hits are identifiable in site logs
pub const TRIGGER_USER_AGENT: &str = "Cloudflare-Worker-WP-Cron";

/// Wall-clock budget for one trigger request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response-body excerpt carried into a failure outcome
pub const BODY_EXCERPT_CHARS: usize = 500;
