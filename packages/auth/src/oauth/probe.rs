// ABOUTME: Non-destructive diagnostics for the OAuth configuration
// ABOUTME: Runs ordered checks without short-circuiting so every problem surfaces at once

use std::time::Duration;

use reqwest::{redirect, Client};
use tracing::debug;
use url::Url;

use edgecron_settings::OAuthSettings;

const PROBE_TIMEOUT_SECS: u64 = 10;
const PROBE_BODY_CHARS: usize = 140;
const PROBE_STATE: &str = "edgecron-oauth-probe";
const PROBE_CODE: &str = "edgecron-invalid-code";

/// One diagnostic result. Checks are ordered and independent, a failed
/// check never hides the ones after it.
#[derive(Debug, Clone)]
pub struct ProbeCheck {
    pub label: String,
    pub ok: bool,
    pub detail: String,
}

impl ProbeCheck {
    fn new(label: &str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            ok,
            detail: detail.into(),
        }
    }
}

/// Run the configuration checks, then reachability checks against any
/// endpoint whose prerequisites are present.
pub async fn run_oauth_probe(oauth: &OAuthSettings, redirect_uri: &str) -> Vec<ProbeCheck> {
    let client_id = oauth.client_id.trim();
    let client_secret = oauth.client_secret.trim();
    let auth_url = oauth.auth_url.trim();
    let token_url = oauth.token_url.trim();

    let mut checks = vec![
        ProbeCheck::new(
            "Client ID is set",
            !client_id.is_empty(),
            if client_id.is_empty() {
                "Missing OAuth Client ID"
            } else {
                "Present"
            },
        ),
        ProbeCheck::new(
            "Client Secret is set",
            !client_secret.is_empty(),
            if client_secret.is_empty() {
                "Missing OAuth Client Secret"
            } else {
                "Present"
            },
        ),
        ProbeCheck::new(
            "Authorization URL format",
            is_valid_url(auth_url),
            if is_valid_url(auth_url) {
                "Valid URL"
            } else {
                "Invalid authorization URL"
            },
        ),
        ProbeCheck::new(
            "Token URL format",
            is_valid_url(token_url),
            if is_valid_url(token_url) {
                "Valid URL"
            } else {
                "Invalid token URL"
            },
        ),
    ];

    if is_valid_url(auth_url) {
        checks.push(check_authorization_endpoint(auth_url, client_id, redirect_uri).await);
    }

    if is_valid_url(token_url) && !client_id.is_empty() && !client_secret.is_empty() {
        checks.push(
            check_token_endpoint(token_url, client_id, client_secret, redirect_uri).await,
        );
    }

    checks
}

/// GET the authorization URL with the usual query parameters and a
/// throwaway state. Redirects stay unfollowed, a redirect to the login
/// page is the healthy answer here.
async fn check_authorization_endpoint(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
) -> ProbeCheck {
    const LABEL: &str = "Authorization endpoint reachable";

    let client = match Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .redirect(redirect::Policy::none())
        .build()
    {
        Ok(client) => client,
        Err(e) => return ProbeCheck::new(LABEL, false, e.to_string()),
    };

    let client_id = if client_id.is_empty() {
        "missing-client-id"
    } else {
        client_id
    };
    let result = client
        .get(auth_url)
        .query(&[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("state", PROBE_STATE),
        ])
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            debug!("Authorization endpoint probe returned HTTP {}", status);
            ProbeCheck::new(LABEL, probe_status_ok(status), format!("HTTP {}", status))
        }
        Err(e) => ProbeCheck::new(LABEL, false, e.to_string()),
    }
}

/// POST a deliberately invalid grant. Any well-formed OAuth rejection
/// still proves the endpoint is alive and talking to us.
async fn check_token_endpoint(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> ProbeCheck {
    const LABEL: &str = "Token endpoint reachable";

    let client = match Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => return ProbeCheck::new(LABEL, false, e.to_string()),
    };

    let result = client
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", PROBE_CODE),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.trim().chars().take(PROBE_BODY_CHARS).collect();
            debug!("Token endpoint probe returned HTTP {}", status);
            let detail = if excerpt.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {} - {}", status, excerpt)
            };
            ProbeCheck::new(LABEL, probe_status_ok(status), detail)
        }
        Err(e) => ProbeCheck::new(LABEL, false, e.to_string()),
    }
}

fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Anything that shows a live, OAuth-shaped endpoint counts. Rejections
/// of our garbage grant are expected, an origin error is not.
fn probe_status_ok(status: u16) -> bool {
    if (200..400).contains(&status) {
        return true;
    }
    matches!(status, 400 | 401 | 403 | 405)
}
