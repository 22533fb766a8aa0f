// ABOUTME: The auto-setup orchestrator deploying the cron Worker end to end
// ABOUTME: Ordered steps from credential freshness through schedule and route, each aborting on failure

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use tracing::{debug, error, info};
use url::Url;

use edgecron_auth::OAuthManager;
use edgecron_cloudflare::{ApiClient, WorkerRoute};
use edgecron_settings::{types::DEFAULT_CRON_EXPRESSION, SettingsStore};

use crate::{
    error::{SetupError, SetupResult},
    resolver::resolve_zone,
    script::{worker_script, SECRET_KEY_BINDING, SITE_URL_BINDING},
};

const SECRET_LENGTH: usize = 48;
const WORKER_NAME_PREFIX: &str = "edgecron";

/// Terminal result of one setup run: exactly one message, success or not
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    pub ok: bool,
    pub message: String,
}

/// Runs the whole provisioning pipeline against one configured site.
///
/// Steps run strictly in order and the first failure ends the run with
/// that step's message. Every run re-reads the settings and re-resolves
/// the zone; nothing from a previous run is trusted except the stored
/// secret, which is deliberately reused so repeat runs are idempotent.
pub struct SetupOrchestrator {
    store: Arc<dyn SettingsStore>,
    oauth: OAuthManager,
    api_base: String,
}

impl SetupOrchestrator {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self::with_api_base(store, edgecron_cloudflare::API_BASE)
    }

    /// Point every API call at a different base URL, used by tests
    pub fn with_api_base(store: Arc<dyn SettingsStore>, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        Self {
            oauth: OAuthManager::with_api_base(store.clone(), api_base.clone()),
            store,
            api_base,
        }
    }

    pub async fn run(&self) -> SetupOutcome {
        match self.provision().await {
            Ok(message) => {
                info!("✅ {}", message);
                SetupOutcome { ok: true, message }
            }
            Err(e) => {
                error!("Auto-setup failed: {}", e);
                SetupOutcome {
                    ok: false,
                    message: e.to_string(),
                }
            }
        }
    }

    async fn provision(&self) -> SetupResult<String> {
        let mut settings = self.store.load().await?;

        // A missing access token with a stored refresh token gets one
        // silent recovery attempt; failure falls through to the
        // credential check below
        if !settings.credential.has_token() && !settings.credential.refresh_token.is_empty() {
            match self.oauth.refresh().await {
                Ok(()) => settings = self.store.load().await?,
                Err(e) => debug!("Opportunistic token refresh failed: {}", e),
            }
        }

        if !settings.credential.has_token() {
            return Err(SetupError::MissingCredential);
        }

        // An expiring token is refreshed up front so no later step can
        // fail halfway through on a stale credential
        if settings.credential.needs_refresh(Utc::now().timestamp()) {
            self.oauth
                .refresh()
                .await
                .map_err(|e| SetupError::RefreshFailed(e.to_string()))?;
            settings = self.store.load().await?;
        }

        let token = settings.credential.access_token.trim().to_string();
        let api = ApiClient::with_base_url(&self.api_base, &token)
            .map_err(|e| SetupError::Client(e.to_string()))?;

        api.verify_token()
            .await
            .map_err(|e| SetupError::VerificationFailed(e.to_string()))?;

        let host = site_host(&settings.site_url).ok_or(SetupError::MissingHost)?;

        let zone = resolve_zone(&api, &host).await?;
        if zone.id.is_empty() || zone.account.id.is_empty() {
            return Err(SetupError::IncompleteZone);
        }
        let account_id = zone.account.id.clone();

        let worker_name = if settings.worker_name.trim().is_empty() {
            derive_worker_name(&host)
        } else {
            settings.worker_name.trim().to_string()
        };
        let route_pattern = format!("{}/wp-cron.php*", host);
        let cron_expression = match settings.cron_expression.trim() {
            "" => DEFAULT_CRON_EXPRESSION.to_string(),
            configured => configured.to_string(),
        };

        // The secret must exist and be persisted before anything is
        // deployed, otherwise a failed later step would leave a Worker
        // holding a key the site never learned
        if settings.secret_key.is_empty() {
            settings.secret_key = generate_secret();
            self.store.save(&settings).await?;
            info!("Generated and stored a new shared secret");
        }

        info!("Uploading Worker script {} to account {}", worker_name, account_id);
        api.upload_script(&account_id, &worker_name, worker_script())
            .await
            .map_err(|e| SetupError::Upload(e.to_string()))?;

        api.put_secret(&account_id, &worker_name, SITE_URL_BINDING, &settings.site_url)
            .await
            .map_err(|e| SetupError::Secret {
                name: SITE_URL_BINDING.to_string(),
                message: e.to_string(),
            })?;
        api.put_secret(
            &account_id,
            &worker_name,
            SECRET_KEY_BINDING,
            &settings.secret_key,
        )
        .await
        .map_err(|e| SetupError::Secret {
            name: SECRET_KEY_BINDING.to_string(),
            message: e.to_string(),
        })?;

        self.put_schedule(&api, &account_id, &worker_name, &cron_expression)
            .await?;

        upsert_route(&api, &zone.id, &route_pattern, &worker_name).await?;

        let zone_label = if zone.name.is_empty() {
            host.clone()
        } else {
            zone.name.clone()
        };
        Ok(format!(
            "Auto-setup complete. Zone: {}. Worker: {}. Route: {}. Schedule: {}.",
            zone_label, worker_name, route_pattern, cron_expression
        ))
    }

    /// Replace the cron triggers, retrying once with the wrapped
    /// envelope shape some deployments expect. One fixed alternate
    /// attempt, never a retry loop.
    async fn put_schedule(
        &self,
        api: &ApiClient,
        account_id: &str,
        worker_name: &str,
        cron_expression: &str,
    ) -> SetupResult<()> {
        let list_shape = json!([{ "cron": cron_expression }]);
        let first = api.put_schedules(account_id, worker_name, &list_shape).await;
        if let Err(e) = first {
            debug!("Schedule list shape rejected ({}), retrying wrapped shape", e);
            let wrapped_shape = json!({ "schedules": [{ "cron": cron_expression }] });
            api.put_schedules(account_id, worker_name, &wrapped_shape)
                .await
                .map_err(|e| SetupError::Schedule(e.to_string()))?;
        }
        Ok(())
    }
}

/// Point the zone's route at the Worker: update the route whose pattern
/// matches exactly, otherwise create it.
async fn upsert_route(
    api: &ApiClient,
    zone_id: &str,
    pattern: &str,
    worker_name: &str,
) -> SetupResult<()> {
    let routes = api
        .list_routes(zone_id)
        .await
        .map_err(|e| SetupError::Route(e.to_string()))?;

    let existing: Option<&WorkerRoute> = routes
        .iter()
        .find(|route| route.pattern == pattern && !route.id.is_empty());

    let result = match existing {
        Some(route) => {
            debug!("Updating existing route {} for {}", route.id, pattern);
            api.update_route(zone_id, &route.id, pattern, worker_name).await
        }
        None => {
            debug!("Creating route {}", pattern);
            api.create_route(zone_id, pattern, worker_name).await
        }
    };

    result.map_err(|e| SetupError::Route(e.to_string()))
}

/// Hostname of the configured site URL, if one can be parsed
fn site_host(site_url: &str) -> Option<String> {
    let trimmed = site_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    Url::parse(trimmed)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Worker name derived from the hostname: lowercased, every character
/// outside `[a-z0-9_-]` replaced by a dash, boundary dashes trimmed
pub fn derive_worker_name(host: &str) -> String {
    let base: String = host
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{}-{}", WORKER_NAME_PREFIX, base.trim_matches('-'))
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}
