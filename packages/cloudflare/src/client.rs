//! Envelope-aware HTTP client for the Cloudflare v4 API

use std::time::Duration;

use reqwest::{multipart, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::types::{WorkerRoute, Zone};
use crate::API_BASE;

const REQUEST_TIMEOUT_SECS: u64 = 20;
/// Script uploads carry the whole module body, give them longer
const UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Client for the few Cloudflare endpoints provisioning needs
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(token: impl Into<String>) -> ApiResult<Self> {
        Self::with_base_url(API_BASE, token)
    }

    /// Point the client at a different API base, used by tests
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Perform one API call and unwrap the v4 envelope.
    ///
    /// Returns the envelope's `result` on success. The envelope decides
    /// the outcome; HTTP status is not consulted.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        tracing::debug!("Cloudflare API {} {}", method, path);

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.execute(builder).await
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> ApiResult<Value> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|_| ApiError::InvalidResponse("body is not JSON".to_string()))?;
        if !envelope.is_object() {
            return Err(ApiError::InvalidResponse(
                "body is not a JSON object".to_string(),
            ));
        }

        if envelope
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
        } else {
            Err(ApiError::Rejected(first_error_message(&envelope)))
        }
    }

    /// Confirm the token is valid for API use
    pub async fn verify_token(&self) -> ApiResult<()> {
        self.request(Method::GET, "/user/tokens/verify", None)
            .await
            .map(|_| ())
    }

    /// Email of the authenticated user, empty when the API omits it
    pub async fn user_email(&self) -> ApiResult<String> {
        let result = self.request(Method::GET, "/user", None).await?;
        Ok(result
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Exact active-zone lookup by name
    pub async fn find_zone(&self, name: &str) -> ApiResult<Option<Zone>> {
        let path = format!("/zones?status=active&name={}", urlencoding::encode(name));
        let result = self.request(Method::GET, &path, None).await?;
        let zones: Vec<Zone> = decode(result, "zone lookup")?;
        Ok(zones.into_iter().next())
    }

    /// First page of active zones, enough for suffix matching
    pub async fn list_zones(&self) -> ApiResult<Vec<Zone>> {
        let result = self
            .request(Method::GET, "/zones?status=active&per_page=50", None)
            .await?;
        decode(result, "zone listing")
    }

    pub async fn list_routes(&self, zone_id: &str) -> ApiResult<Vec<WorkerRoute>> {
        let path = format!("/zones/{}/workers/routes", zone_id);
        let result = self.request(Method::GET, &path, None).await?;
        decode(result, "route listing")
    }

    pub async fn create_route(
        &self,
        zone_id: &str,
        pattern: &str,
        script_name: &str,
    ) -> ApiResult<()> {
        let path = format!("/zones/{}/workers/routes", zone_id);
        let body = serde_json::json!({ "pattern": pattern, "script": script_name });
        self.request(Method::POST, &path, Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn update_route(
        &self,
        zone_id: &str,
        route_id: &str,
        pattern: &str,
        script_name: &str,
    ) -> ApiResult<()> {
        let path = format!("/zones/{}/workers/routes/{}", zone_id, route_id);
        let body = serde_json::json!({ "pattern": pattern, "script": script_name });
        self.request(Method::PUT, &path, Some(&body))
            .await
            .map(|_| ())
    }

    /// Store one secret on a Worker script
    pub async fn put_secret(
        &self,
        account_id: &str,
        script_name: &str,
        name: &str,
        value: &str,
    ) -> ApiResult<()> {
        let path = format!(
            "/accounts/{}/workers/scripts/{}/secrets",
            account_id, script_name
        );
        let body = serde_json::json!({ "name": name, "text": value, "type": "secret_text" });
        self.request(Method::PUT, &path, Some(&body))
            .await
            .map(|_| ())
    }

    /// Replace the cron triggers of a Worker script.
    ///
    /// Takes the request body verbatim because deployments answer to two
    /// different envelope shapes and the caller owns the fallback.
    pub async fn put_schedules(
        &self,
        account_id: &str,
        script_name: &str,
        body: &Value,
    ) -> ApiResult<()> {
        let path = format!(
            "/accounts/{}/workers/scripts/{}/schedules",
            account_id, script_name
        );
        self.request(Method::PUT, &path, Some(body))
            .await
            .map(|_| ())
    }

    /// Upload a Worker as an ES module.
    ///
    /// Multipart PUT with a JSON metadata part naming `main.js` as the
    /// main module and the source itself as a module part. The form
    /// boundary is generated fresh per request.
    pub async fn upload_script(
        &self,
        account_id: &str,
        script_name: &str,
        source: &str,
    ) -> ApiResult<()> {
        let metadata = serde_json::json!({
            "main_module": "main.js",
            "compatibility_date": chrono::Utc::now().format("%Y-%m-%d").to_string(),
            "bindings": [],
        });

        let metadata_part = multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let script_part = multipart::Part::text(source.to_string())
            .file_name("main.js")
            .mime_str("application/javascript+module")
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = multipart::Form::new()
            .part("metadata", metadata_part)
            .part("main.js", script_part);

        let url = format!(
            "{}/accounts/{}/workers/scripts/{}",
            self.base_url, account_id, script_name
        );
        tracing::debug!("Cloudflare API PUT {} (module upload)", url);

        let builder = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .multipart(form);
        self.execute(builder).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(result: Value, what: &str) -> ApiResult<Vec<T>> {
    // A null result stands for an empty collection in the v4 envelope
    if result.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(result).map_err(|e| ApiError::InvalidResponse(format!("{}: {}", what, e)))
}

fn first_error_message(envelope: &Value) -> String {
    let first = match envelope
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        Some(error) => error,
        None => return "Unknown Cloudflare API error".to_string(),
    };

    let code = match first.get("code") {
        Some(Value::Number(code)) => code.to_string(),
        Some(Value::String(code)) => code.clone(),
        _ => String::new(),
    };
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Request failed");

    format!("{} {}", code, message).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_error_renders_code_and_message() {
        let envelope = json!({
            "success": false,
            "errors": [
                { "code": 10000, "message": "Authentication error" },
                { "code": 9999, "message": "ignored" }
            ]
        });
        assert_eq!(first_error_message(&envelope), "10000 Authentication error");
    }

    #[test]
    fn first_error_without_code_is_trimmed() {
        let envelope = json!({
            "success": false,
            "errors": [{ "message": "Zone not found" }]
        });
        assert_eq!(first_error_message(&envelope), "Zone not found");
    }

    #[test]
    fn missing_errors_fall_back_to_generic_message() {
        assert_eq!(
            first_error_message(&json!({ "success": false })),
            "Unknown Cloudflare API error"
        );
        assert_eq!(
            first_error_message(&json!({ "success": false, "errors": [] })),
            "Unknown Cloudflare API error"
        );
    }

    #[test]
    fn error_without_message_uses_default_text() {
        let envelope = json!({
            "success": false,
            "errors": [{ "code": 7003 }]
        });
        assert_eq!(first_error_message(&envelope), "7003 Request failed");
    }
}
