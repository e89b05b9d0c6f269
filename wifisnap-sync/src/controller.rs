//! Wireless controller HTTP API client
//!
//! Speaks the controller's management API: a form-encoded login that yields a
//! session cookie, an anti-forgery token, and a session identifier, followed
//! by authenticated read-only show commands. One client per controller per
//! refresh pass; sessions are never persisted. Retry policy, if any, belongs
//! to the caller.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use wifisnap_common::config::FetchConfig;

/// Controller client errors
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Transport-level failure (unreachable endpoint, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Controller answered but rejected the login in its result envelope
    #[error("Login rejected (status {0})")]
    LoginRejected(String),

    /// Response body was not the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

/// Client for one controller endpoint
pub struct ControllerClient {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

/// Short-lived credentials from a successful login
///
/// The anti-forgery token goes into the `X-CSRF-Token` header and the session
/// identifier into the `UIDARUBA` query parameter on every subsequent call;
/// the session cookie rides along in the client's cookie jar.
pub struct Session {
    http_client: reqwest::Client,
    base_url: String,
    csrf_token: String,
    session_id: String,
}

impl ControllerClient {
    /// Build a client for one endpoint.
    ///
    /// Certificate validation is skipped only when the configuration opts in
    /// via `danger_accept_invalid_certs`; internal controllers commonly
    /// present self-signed certificates.
    pub fn new(base_url: &str, config: &FetchConfig) -> Result<Self, ControllerError> {
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.danger_accept_invalid_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// POST credentials to `/v1/api/login` and extract the session handle
    pub async fn login(self) -> Result<Session, ControllerError> {
        let login_url = format!("{}/v1/api/login", self.base_url);

        tracing::debug!(url = %login_url, "Logging in to controller");

        let response = self
            .http_client
            .post(&login_url)
            .form(&[("username", &self.username), ("password", &self.password)])
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ControllerError::Decode(e.to_string()))?;

        let (csrf_token, session_id) = parse_login_envelope(&body)?;

        Ok(Session {
            http_client: self.http_client,
            base_url: self.base_url,
            csrf_token,
            session_id,
        })
    }
}

impl Session {
    /// Run a read-only show command and return the raw decoded body
    pub async fn show_command(&self, command: &str) -> Result<Value, ControllerError> {
        let cli_url = format!("{}/v1/configuration/showcommand", self.base_url);

        tracing::debug!(url = %cli_url, command = %command, "Running show command");

        let response = self
            .http_client
            .get(&cli_url)
            .header("X-CSRF-Token", &self.csrf_token)
            .query(&[("command", command), ("UIDARUBA", self.session_id.as_str())])
            .send()
            .await
            .map_err(|e| ControllerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControllerError::Network(format!(
                "show command returned HTTP {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ControllerError::Decode(e.to_string()))
    }
}

/// Pull the anti-forgery token and session identifier out of the login
/// response envelope.
///
/// The controller reports success as `"_global_result": {"status": "0", ...}`;
/// any other status is a rejected login, not a transport problem.
fn parse_login_envelope(body: &Value) -> Result<(String, String), ControllerError> {
    let result = body
        .get("_global_result")
        .ok_or_else(|| ControllerError::Decode("missing _global_result".to_string()))?;

    let status = match result.get("status") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(ControllerError::Decode("missing login status".to_string())),
    };
    if status != "0" {
        return Err(ControllerError::LoginRejected(status));
    }

    let csrf_token = result
        .get("X-CSRF-Token")
        .and_then(Value::as_str)
        .ok_or_else(|| ControllerError::Decode("missing X-CSRF-Token".to_string()))?;
    let session_id = result
        .get("UIDARUBA")
        .and_then(Value::as_str)
        .ok_or_else(|| ControllerError::Decode("missing UIDARUBA".to_string()))?;

    Ok((csrf_token.to_string(), session_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_envelope_success() {
        let body = json!({
            "_global_result": {
                "status": "0",
                "status_str": "You've logged in successfully.",
                "X-CSRF-Token": "abc123",
                "UIDARUBA": "session-xyz"
            }
        });

        let (csrf, uid) = parse_login_envelope(&body).unwrap();
        assert_eq!(csrf, "abc123");
        assert_eq!(uid, "session-xyz");
    }

    #[test]
    fn login_envelope_numeric_status_accepted() {
        let body = json!({
            "_global_result": {
                "status": 0,
                "X-CSRF-Token": "abc123",
                "UIDARUBA": "session-xyz"
            }
        });

        assert!(parse_login_envelope(&body).is_ok());
    }

    #[test]
    fn login_envelope_rejection() {
        let body = json!({
            "_global_result": {
                "status": "1",
                "status_str": "Authentication failed."
            }
        });

        let err = parse_login_envelope(&body).unwrap_err();
        assert!(matches!(err, ControllerError::LoginRejected(s) if s == "1"));
    }

    #[test]
    fn login_envelope_missing_result_is_decode_error() {
        let err = parse_login_envelope(&json!({"unexpected": true})).unwrap_err();
        assert!(matches!(err, ControllerError::Decode(_)));
    }

    #[test]
    fn login_envelope_missing_token_is_decode_error() {
        let body = json!({
            "_global_result": { "status": "0", "UIDARUBA": "session-xyz" }
        });

        let err = parse_login_envelope(&body).unwrap_err();
        assert!(matches!(err, ControllerError::Decode(_)));
    }

    #[test]
    fn client_creation() {
        let config = FetchConfig {
            controllers: vec!["https://172.20.254.200:4343".to_string()],
            username: "admin".to_string(),
            password: "secret".to_string(),
            command: "show user-table verbose".to_string(),
            danger_accept_invalid_certs: true,
            timeout_secs: 30,
        };

        let client = ControllerClient::new("https://172.20.254.200:4343/", &config).unwrap();
        assert_eq!(client.base_url, "https://172.20.254.200:4343");
    }
}
