// ABOUTME: OAuth manager orchestrating the Cloudflare credential lifecycle
// ABOUTME: Handles authorization start, callback completion, refresh, and disconnect

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde_json::Value;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use url::Url;

use edgecron_cloudflare::ApiClient;
use edgecron_settings::{OAuthSettings, PendingAuthorization, SettingsStore};

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        probe::{run_oauth_probe, ProbeCheck},
        server::CallbackServer,
        types::{CallbackParams, TokenGrant},
    },
};

/// How long a pending authorization state stays valid
const STATE_TTL_SECS: i64 = 600;
const STATE_LENGTH: usize = 32;
const TOKEN_TIMEOUT_SECS: u64 = 20;

/// OAuth manager for the Cloudflare connection.
///
/// All credential fields in the settings blob are written here and
/// nowhere else, so every mutation is one deliberate store save.
pub struct OAuthManager {
    store: Arc<dyn SettingsStore>,
    http: Client,
    redirect_uri: String,
    api_base: String,
}

impl OAuthManager {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self::with_api_base(store, edgecron_cloudflare::API_BASE)
    }

    /// Point the post-exchange identity lookup at a different API base,
    /// used by tests
    pub fn with_api_base(store: Arc<dyn SettingsStore>, api_base: impl Into<String>) -> Self {
        Self {
            store,
            http: Client::new(),
            redirect_uri: CallbackServer::new().callback_url(),
            api_base: api_base.into(),
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Begin an authorization: persist a fresh single-use state and
    /// return the URL the operator's browser must visit.
    pub async fn start(&self) -> AuthResult<String> {
        let mut settings = self.store.load().await?;

        let client_id = settings.oauth.client_id.trim().to_string();
        let auth_url = settings.oauth.auth_url.trim().to_string();
        if client_id.is_empty() || auth_url.is_empty() {
            return Err(AuthError::Configuration(
                "OAuth client ID or authorization URL is missing".to_string(),
            ));
        }

        let mut url = Url::parse(&auth_url)
            .map_err(|e| AuthError::Configuration(format!("Invalid authorization URL: {}", e)))?;

        let state = generate_state();
        settings.pending_authorization = Some(PendingAuthorization {
            state: state.clone(),
            expires_at: Utc::now().timestamp() + STATE_TTL_SECS,
        });
        self.store.save(&settings).await?;
        debug!("Stored pending authorization state");

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("response_type", "code")
                .append_pair("client_id", &client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("state", &state);
            let scope = settings.oauth.scope.trim();
            if !scope.is_empty() {
                pairs.append_pair("scope", scope);
            }
        }

        info!("Starting Cloudflare OAuth authorization");
        Ok(url.to_string())
    }

    /// Finish an authorization from the redirect parameters.
    ///
    /// Provider errors win over everything and leave the stored state
    /// alone; otherwise the state is consumed on this attempt no matter
    /// how the rest goes. Returns the connected account email, which
    /// stays empty when the identity lookup fails.
    pub async fn complete_callback(&self, params: CallbackParams) -> AuthResult<String> {
        if let Some(provider_error) = params.provider_error() {
            return Err(AuthError::Provider(provider_error));
        }

        let mut settings = self.store.load().await?;

        // Single use: the state is deleted before it is compared
        let pending = settings.pending_authorization.take();
        self.store.save(&settings).await?;

        let received = params.state.as_deref().unwrap_or_default();
        let now = Utc::now().timestamp();
        let state_valid = match &pending {
            Some(pending) if !pending.is_expired(now) && !received.is_empty() => pending
                .state
                .as_bytes()
                .ct_eq(received.as_bytes())
                .into(),
            _ => false,
        };
        if !state_valid {
            return Err(AuthError::StateMismatch);
        }

        let code = params.code.as_deref().unwrap_or_default().trim().to_string();
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }

        let payload = self
            .token_request(
                &settings.oauth,
                TokenGrant::AuthorizationCode {
                    code,
                    redirect_uri: self.redirect_uri.clone(),
                },
            )
            .await?;

        let now = Utc::now().timestamp();
        let (access_token, refresh_token, expires_at) = token_fields(&payload, now)?;
        settings.credential.access_token = access_token;
        // An exchange replaces the refresh token outright, absent included
        settings.credential.refresh_token = refresh_token.unwrap_or_default();
        settings.credential.expires_at = expires_at;
        settings.credential.connected_at = now;
        settings.credential.connected_email = String::new();

        // Best effort: a failed identity lookup only leaves the email empty
        match ApiClient::with_base_url(&self.api_base, &settings.credential.access_token) {
            Ok(api) => match api.user_email().await {
                Ok(email) => settings.credential.connected_email = email,
                Err(e) => debug!("Could not fetch the connected account email: {}", e),
            },
            Err(e) => debug!("Could not build the identity lookup client: {}", e),
        }

        self.store.save(&settings).await?;
        info!("✅ Cloudflare OAuth connected");
        Ok(settings.credential.connected_email)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Keeps the previous refresh token when the response omits one.
    pub async fn refresh(&self) -> AuthResult<()> {
        let mut settings = self.store.load().await?;

        let refresh_token = settings.credential.refresh_token.trim().to_string();
        if refresh_token.is_empty() {
            return Err(AuthError::Configuration(
                "Missing OAuth refresh token".to_string(),
            ));
        }

        let payload = self
            .token_request(&settings.oauth, TokenGrant::RefreshToken { refresh_token })
            .await?;

        let now = Utc::now().timestamp();
        let (access_token, refresh_token, expires_at) = token_fields(&payload, now)?;
        settings.credential.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            settings.credential.refresh_token = refresh_token;
        }
        settings.credential.expires_at = expires_at;

        self.store.save(&settings).await?;
        info!("✅ Refreshed the Cloudflare access token");
        Ok(())
    }

    /// Remove the stored credential in one save. Safe to repeat.
    pub async fn disconnect(&self) -> AuthResult<()> {
        let mut settings = self.store.load().await?;
        settings.credential.clear();
        self.store.save(&settings).await?;
        info!("Cloudflare OAuth connection removed");
        Ok(())
    }

    /// Ordered configuration and reachability checks for the OAuth setup
    pub async fn probe(&self) -> AuthResult<Vec<ProbeCheck>> {
        let settings = self.store.load().await?;
        Ok(run_oauth_probe(&settings.oauth, &self.redirect_uri).await)
    }

    /// Shared primitive behind exchange and refresh.
    ///
    /// Fails closed before any network call when the token endpoint or
    /// client credentials are missing.
    async fn token_request(&self, oauth: &OAuthSettings, grant: TokenGrant) -> AuthResult<Value> {
        let token_url = oauth.token_url.trim();
        let client_id = oauth.client_id.trim();
        let client_secret = oauth.client_secret.trim();
        if token_url.is_empty() || client_id.is_empty() || client_secret.is_empty() {
            return Err(AuthError::Configuration(
                "OAuth token URL, client ID, or client secret is missing".to_string(),
            ));
        }

        debug!("POST {} ({} grant)", token_url, grant.grant_type());
        let response = self
            .http
            .post(token_url)
            .timeout(Duration::from_secs(TOKEN_TIMEOUT_SECS))
            .basic_auth(client_id, Some(client_secret))
            .form(&grant.form_params())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let payload: Value = serde_json::from_str(&body)
            .map_err(|_| AuthError::InvalidResponse("body is not JSON".to_string()))?;
        if !payload.is_object() {
            return Err(AuthError::InvalidResponse(
                "body is not a JSON object".to_string(),
            ));
        }

        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !error.is_empty() {
            let description = payload
                .get("error_description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(AuthError::Provider(
                format!("{} {}", error, description).trim().to_string(),
            ));
        }

        Ok(payload)
    }
}

/// Random alphanumeric state for CSRF protection
fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Pull the token fields out of a grant response.
///
/// `expires_at` becomes an absolute epoch, or 0 when the provider gave
/// no usable `expires_in`.
fn token_fields(payload: &Value, now: i64) -> AuthResult<(String, Option<String>, i64)> {
    let access_token = payload
        .get("access_token")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    if access_token.is_empty() {
        return Err(AuthError::InvalidResponse(
            "token response is missing access_token".to_string(),
        ));
    }

    let refresh_token = payload
        .get("refresh_token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|token| !token.is_empty());

    let expires_in = payload
        .get("expires_in")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let expires_at = if expires_in > 0 { now + expires_in } else { 0 };

    Ok((access_token, refresh_token, expires_at))
}
