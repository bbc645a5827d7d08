use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::SessionError;
use crate::config;

/// What the identity provider hands back on a successful sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub user_id: Option<String>,
    /// Token lifetime in seconds, when the provider reports one
    pub expires_in: Option<i64>,
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Credentials, SessionError>;
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(alias = "idToken", alias = "access_token", alias = "accessToken")]
    token: String,
    #[serde(default, alias = "localId", alias = "userId")]
    user_id: Option<String>,
    #[serde(default, alias = "expiresIn")]
    expires_in: Option<Value>,
}

/// Signs in with `POST {auth_url}/login` and a JSON `{ email, password }` body
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    login_url: Url,
}

impl HttpIdentityProvider {
    pub fn new(auth_url: &str, timeout: Duration) -> Result<Self, SessionError> {
        let mut login_url = Url::parse(auth_url)
            .map_err(|e| SessionError::Provider(format!("invalid auth URL '{}': {}", auth_url, e)))?;
        login_url
            .path_segments_mut()
            .map_err(|_| SessionError::Provider(format!("auth URL '{}' cannot carry a path", auth_url)))?
            .pop_if_empty()
            .push("login");

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        Ok(Self { client, login_url })
    }

    pub fn from_config() -> Result<Self, SessionError> {
        let gateway = &config::config().gateway;
        Self::new(&gateway.auth_url, Duration::from_secs(gateway.timeout_secs))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Credentials, SessionError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&json!({ "email": email, "password": password, "returnSecureToken": true }))
            .send()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| SessionError::Provider(format!("unreadable sign-in response: {}", e)))?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| body.get("error").and_then(|e| e.get("message")).and_then(Value::as_str))
                .or_else(|| body.get("error").and_then(Value::as_str))
                .unwrap_or("sign-in rejected")
                .to_string();
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SessionError::InvalidCredentials(message)
                }
                _ => SessionError::Provider(message),
            });
        }

        let body: SignInResponse = serde_json::from_value(body)
            .map_err(|e| SessionError::Provider(format!("unexpected sign-in response: {}", e)))?;

        Ok(Credentials {
            token: body.token,
            user_id: body.user_id,
            expires_in: body.expires_in.as_ref().and_then(parse_seconds),
        })
    }
}

/// Providers report lifetimes as numbers or numeric strings
fn parse_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
