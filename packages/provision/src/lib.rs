// ABOUTME: Edgecron provisioning library deploying the cron Worker onto Cloudflare
// ABOUTME: Zone resolution, the auto-setup pipeline, and the embedded Worker script

pub mod error;
pub mod resolver;
pub mod script;
pub mod setup;

// Re-export main types
pub use error::{SetupError, SetupResult};
pub use resolver::{best_zone_match, resolve_zone};
pub use script::{worker_script, SECRET_KEY_BINDING, SITE_URL_BINDING};
pub use setup::{derive_worker_name, SetupOrchestrator, SetupOutcome};
