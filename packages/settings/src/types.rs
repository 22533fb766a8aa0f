// ABOUTME: Type definitions for the persisted edgecron settings blob
// ABOUTME: Site configuration, OAuth app settings, credential, and pending authorization

use serde::{Deserialize, Serialize};

/// Default Cloudflare OAuth endpoints
pub const DEFAULT_AUTH_URL: &str = "https://dash.cloudflare.com/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://dash.cloudflare.com/oauth2/token";

/// Scope covering everything auto-setup touches, shown as copy-paste help
pub const SUGGESTED_SCOPE: &str =
    "account.workers.scripts:write zone.workers_routes:write zone:read user:read";

/// Default schedule: fire every minute
pub const DEFAULT_CRON_EXPRESSION: &str = "* * * * *";

/// Refresh the access token when it expires within this many seconds
pub const TOKEN_REFRESH_LEEWAY_SECS: i64 = 60;

/// Everything edgecron persists, stored as one TOML document.
///
/// Unset string fields are `""` and unset epochs are `0` so the blob
/// always round-trips whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the site whose cron endpoint gets triggered
    pub site_url: String,
    /// Worker script name override; derived from the hostname when empty
    pub worker_name: String,
    /// Cron expression for the scheduled trigger
    pub cron_expression: String,
    /// Shared secret presented by the Worker on every trigger request
    pub secret_key: String,
    pub oauth: OAuthSettings,
    pub credential: Credential,
    /// In-flight authorization state, present only between start and callback
    pub pending_authorization: Option<PendingAuthorization>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            worker_name: String::new(),
            cron_expression: DEFAULT_CRON_EXPRESSION.to_string(),
            secret_key: String::new(),
            oauth: OAuthSettings::default(),
            credential: Credential::default(),
            pending_authorization: None,
        }
    }
}

/// OAuth application settings for the Cloudflare connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scope: String::new(),
        }
    }
}

/// The stored Cloudflare credential.
///
/// `access_token` is a single slot: a pasted static API token and an
/// OAuth-issued access token land in the same field, so every consumer
/// reads one place. Only the OAuth flows and explicit configuration
/// write these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Epoch seconds; `0` means no known expiry and disables proactive refresh
    pub expires_at: i64,
    pub connected_email: String,
    /// Epoch seconds of the last successful authorization, `0` if never
    pub connected_at: i64,
}

impl Credential {
    /// Whether a usable token is present
    pub fn has_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// Whether the token should be refreshed before use at `now`.
    ///
    /// True only when an expiry is known, it falls within the leeway
    /// window, and a refresh token exists to act on.
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at > 0
            && self.expires_at <= now + TOKEN_REFRESH_LEEWAY_SECS
            && !self.refresh_token.is_empty()
    }

    /// Reset every credential field to its unset sentinel
    pub fn clear(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
        self.expires_at = 0;
        self.connected_email.clear();
        self.connected_at = 0;
    }
}

/// Single-use OAuth state, kept only while an authorization is in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    /// Epoch seconds after which the state is no longer accepted
    pub expires_at: i64,
}

impl PendingAuthorization {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_oauth_endpoints_and_cron() {
        let settings = Settings::default();
        assert_eq!(settings.oauth.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(settings.oauth.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.cron_expression, "* * * * *");
        assert!(settings.site_url.is_empty());
        assert!(settings.pending_authorization.is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings: Settings = toml::from_str("site_url = \"https://example.com\"")
            .expect("partial settings should deserialize");
        assert_eq!(settings.site_url, "https://example.com");
        assert_eq!(settings.oauth.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.credential.expires_at, 0);
    }

    #[test]
    fn needs_refresh_only_inside_leeway_with_refresh_token() {
        let now = 1_700_000_000;
        let mut credential = Credential {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
            expires_at: now + 30,
            ..Credential::default()
        };
        assert!(credential.needs_refresh(now));

        credential.expires_at = now + 120;
        assert!(!credential.needs_refresh(now));

        // Unknown expiry never triggers a proactive refresh
        credential.expires_at = 0;
        assert!(!credential.needs_refresh(now));

        // No refresh token means nothing to act on
        credential.expires_at = now + 30;
        credential.refresh_token.clear();
        assert!(!credential.needs_refresh(now));
    }

    #[test]
    fn clear_resets_every_field() {
        let mut credential = Credential {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
            expires_at: 123,
            connected_email: "admin@example.com".into(),
            connected_at: 456,
        };
        credential.clear();
        assert!(!credential.has_token());
        assert!(credential.refresh_token.is_empty());
        assert_eq!(credential.expires_at, 0);
        assert!(credential.connected_email.is_empty());
        assert_eq!(credential.connected_at, 0);
    }

    #[test]
    fn pending_authorization_expiry() {
        let pending = PendingAuthorization {
            state: "abc".into(),
            expires_at: 1_000,
        };
        assert!(!pending.is_expired(999));
        assert!(pending.is_expired(1_000));
        assert!(pending.is_expired(1_001));
    }
}
