// ABOUTME: OAuth callback server for handling authorization redirects
// ABOUTME: Listens on localhost for the redirect and extracts the callback parameters

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use crate::oauth::types::CallbackParams;

/// Path the OAuth application must register as its redirect URI
pub const CALLBACK_PATH: &str = "/oauth/callback";

const DEFAULT_PORT: u16 = 8787;

/// One-shot loopback server for the OAuth redirect
pub struct CallbackServer {
    port: u16,
}

impl Default for CallbackServer {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackServer {
    pub fn new() -> Self {
        Self { port: DEFAULT_PORT }
    }

    pub fn with_port(port: u16) -> Self {
        Self { port }
    }

    /// The redirect URI this server answers
    pub fn callback_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, CALLBACK_PATH)
    }

    /// Block until the browser delivers the OAuth redirect.
    ///
    /// Returns whatever parameters arrived; the manager decides what
    /// they mean. Stray requests (favicons and the like) get a 404 and
    /// the server keeps waiting.
    pub async fn wait_for_callback(&self) -> AuthResult<CallbackParams> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthError::CallbackServer(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("📡 Waiting for OAuth callback on {}", addr);

        loop {
            let (mut stream, peer_addr) = listener.accept().await.map_err(|e| {
                AuthError::CallbackServer(format!("Failed to accept connection: {}", e))
            })?;
            debug!("Received connection from {}", peer_addr);

            let mut buffer = vec![0; 4096];
            let n = stream
                .read(&mut buffer)
                .await
                .map_err(|e| AuthError::CallbackServer(format!("Failed to read request: {}", e)))?;
            let request = String::from_utf8_lossy(&buffer[..n]);

            let target = match request_target(&request) {
                Some(target) => target,
                None => {
                    let _ = stream.write_all(not_found_response().as_bytes()).await;
                    continue;
                }
            };

            if !target.starts_with(CALLBACK_PATH) {
                debug!("Ignoring request for {}", target);
                let _ = stream.write_all(not_found_response().as_bytes()).await;
                continue;
            }

            let params = parse_callback_query(&target);
            let response = if params.error.is_some() {
                error_response("The provider reported an authorization error.")
            } else if params.code.is_some() {
                success_response()
            } else {
                error_response("No authorization code found in the callback.")
            };
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                debug!("Failed to send callback response: {}", e);
            }

            return Ok(params);
        }
    }
}

/// Request target of the first HTTP request line
fn request_target(request: &str) -> Option<String> {
    request
        .lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

fn parse_callback_query(target: &str) -> CallbackParams {
    let query = target.splitn(2, '?').nth(1).unwrap_or_default();
    let mut params = CallbackParams::default();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            "error_description" => params.error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    params
}

fn success_response() -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        SUCCESS_HTML.len(),
        SUCCESS_HTML
    )
}

fn error_response(error_msg: &str) -> String {
    let html = format!(
        r#"<html><body><h1>❌ Authorization Failed</h1><p>{}</p><p>You can close this tab and return to your terminal.</p></body></html>"#,
        error_msg
    );
    format!(
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        html.len(),
        html
    )
}

fn not_found_response() -> String {
    let html = "<html><body><h1>Not Found</h1></body></html>";
    format!(
        "HTTP/1.1 404 Not Found\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        html.len(),
        html
    )
}

const SUCCESS_HTML: &str = r#"<html>
<head>
    <title>Cloudflare Connected</title>
    <style>
        body { font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 100px auto; text-align: center; }
        h1 { color: #22c55e; }
        p { color: #64748b; }
    </style>
</head>
<body>
    <h1>✅ Authorization Successful!</h1>
    <p>Edgecron is now connected to your Cloudflare account.</p>
    <p>You can close this tab and return to your terminal.</p>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target() {
        let request = "GET /oauth/callback?code=abc123 HTTP/1.1\r\nHost: localhost:8787\r\n";
        assert_eq!(
            request_target(request),
            Some("/oauth/callback?code=abc123".to_string())
        );
    }

    #[test]
    fn test_parse_code_and_state() {
        let params = parse_callback_query("/oauth/callback?code=abc123&state=xyz789");
        assert_eq!(params.code, Some("abc123".to_string()));
        assert_eq!(params.state, Some("xyz789".to_string()));
        assert_eq!(params.error, None);
    }

    #[test]
    fn test_parse_provider_error() {
        let params =
            parse_callback_query("/oauth/callback?error=access_denied&error_description=nope");
        assert_eq!(params.error, Some("access_denied".to_string()));
        assert_eq!(params.error_description, Some("nope".to_string()));
        assert_eq!(params.code, None);
    }

    #[test]
    fn test_parse_urlencoded_values() {
        let params = parse_callback_query(
            "/oauth/callback?error=access_denied&error_description=user%20said%20no",
        );
        assert_eq!(
            params.error_description,
            Some("user said no".to_string())
        );
    }

    #[test]
    fn test_parse_without_query() {
        let params = parse_callback_query("/oauth/callback");
        assert_eq!(params.code, None);
        assert_eq!(params.state, None);
    }

    #[test]
    fn test_callback_url() {
        let server = CallbackServer::new();
        assert_eq!(server.callback_url(), "http://localhost:8787/oauth/callback");

        let server = CallbackServer::with_port(9090);
        assert_eq!(server.callback_url(), "http://localhost:9090/oauth/callback");
    }
}
