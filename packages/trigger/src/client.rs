//! The trigger request itself plus the two entry points built on it

use std::time::{Duration, Instant};

use reqwest::header;

use crate::outcome::TriggerOutcome;
use crate::{
    AUTH_HEADER, BODY_EXCERPT_CHARS, CACHE_BUST_QUERY, CRON_ENDPOINT_PATH, FETCH_TIMEOUT,
    TRIGGER_USER_AGENT,
};

/// Fires the cron endpoint once per call, bounded by a deadline
#[derive(Debug, Clone)]
pub struct TriggerClient {
    timeout: Duration,
}

impl Default for TriggerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerClient {
    pub fn new() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
        }
    }

    /// Override the deadline, used by tests
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Hit `<site_url>/wp-cron.php?doing_wp_cron` once.
    ///
    /// Infallible by contract: misconfiguration, timeouts, refused
    /// connections, and bad statuses all come back as outcomes.
    pub async fn trigger(&self, site_url: &str, secret_key: &str) -> TriggerOutcome {
        if site_url.trim().is_empty() {
            return TriggerOutcome::MissingConfig {
                name: "site_url".to_string(),
            };
        }
        if secret_key.trim().is_empty() {
            return TriggerOutcome::MissingConfig {
                name: "secret_key".to_string(),
            };
        }

        // The deadline covers the whole exchange, body read included
        let http = match reqwest::Client::builder().timeout(self.timeout).build() {
            Ok(http) => http,
            Err(e) => {
                return TriggerOutcome::Failed {
                    detail: e.to_string(),
                }
            }
        };

        let base_url = site_url.trim_end_matches('/');
        let cron_url = format!("{}{}?{}", base_url, CRON_ENDPOINT_PATH, CACHE_BUST_QUERY);
        let started = Instant::now();

        let response = match http
            .get(&cron_url)
            .header(header::USER_AGENT, TRIGGER_USER_AGENT)
            .header(AUTH_HEADER, secret_key)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!("cron trigger timed out for {}", base_url);
                return TriggerOutcome::Timeout;
            }
            Err(e) => {
                return TriggerOutcome::Failed {
                    detail: e.to_string(),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let excerpt = body_excerpt(response).await;
            return TriggerOutcome::RemoteFailure {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                excerpt,
            };
        }

        tracing::debug!(
            "cron endpoint answered {} in {}ms",
            status,
            started.elapsed().as_millis()
        );
        TriggerOutcome::Completed
    }
}

/// Scheduled entry point: run to completion, log, discard the outcome
pub async fn run_scheduled(client: &TriggerClient, site_url: &str, secret_key: &str) {
    let outcome = client.trigger(site_url, secret_key).await;
    if outcome.is_success() {
        tracing::info!("scheduled cron trigger completed for {}", site_url);
    } else {
        tracing::error!("scheduled cron trigger failed: {}", outcome);
    }
}

/// Probe entry point: same request, outcome handed back to the caller
pub async fn run_probe(client: &TriggerClient, site_url: &str, secret_key: &str) -> TriggerOutcome {
    client.trigger(site_url, secret_key).await
}

async fn body_excerpt(response: reqwest::Response) -> String {
    let text = match response.text().await {
        Ok(text) => text,
        Err(_) => return "(could not read response body)".to_string(),
    };

    let excerpt: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
    let excerpt = excerpt.trim().to_string();
    if excerpt.is_empty() {
        "(empty body)".to_string()
    } else {
        excerpt
    }
}
