// ABOUTME: Core type definitions for the OAuth flow
// ABOUTME: Callback parameters and the two token grants the manager performs

/// Query parameters delivered to the OAuth redirect URI.
///
/// Everything is optional because the provider decides what it sends;
/// the manager classifies whatever arrived.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Provider-reported error, empty strings treated as absent
    pub fn provider_error(&self) -> Option<String> {
        let error = self.error.as_deref().unwrap_or_default().trim();
        if error.is_empty() {
            return None;
        }
        let description = self
            .error_description
            .as_deref()
            .unwrap_or_default()
            .trim();
        Some(format!("{} {}", error, description).trim().to_string())
    }
}

/// Which grant a token request performs
#[derive(Debug, Clone)]
pub enum TokenGrant {
    AuthorizationCode { code: String, redirect_uri: String },
    RefreshToken { refresh_token: String },
}

impl TokenGrant {
    /// Form body for the token endpoint
    pub fn form_params(&self) -> Vec<(&'static str, &str)> {
        match self {
            TokenGrant::AuthorizationCode { code, redirect_uri } => vec![
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
            ],
            TokenGrant::RefreshToken { refresh_token } => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
        }
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode { .. } => "authorization_code",
            TokenGrant::RefreshToken { .. } => "refresh_token",
        }
    }
}
