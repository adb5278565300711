//! services/api/src/adapters/hosted.rs
//!
//! Shared plumbing for the hosted auth + table API: request construction with the
//! project key, and translation of provider responses into `PortError`s.

use hogarzen_core::ports::{PortError, PortResult};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A handle on the hosted project. Without credentials every call fails with
/// `PortError::NotConfigured`.
#[derive(Clone)]
pub struct HostedApi {
    http: Client,
    credentials: Option<(String, String)>,
}

impl HostedApi {
    /// `credentials` is `(project_url, anon_key)`.
    pub fn new(http: Client, credentials: Option<(String, String)>) -> Self {
        Self { http, credentials }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Builds a request against `path`, authorized with the user token when given
    /// and with the anonymous key otherwise.
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> PortResult<RequestBuilder> {
        let (url, key) = self.credentials.as_ref().ok_or_else(|| {
            PortError::NotConfigured("SUPABASE_URL / SUPABASE_ANON_KEY".to_string())
        })?;
        Ok(self
            .http
            .request(method, format!("{url}{path}"))
            .header("apikey", key)
            .bearer_auth(token.unwrap_or(key)))
    }
}

//=========================================================================================
// Response Handling
//=========================================================================================

pub async fn send(request: RequestBuilder) -> PortResult<Response> {
    request.send().await.map_err(transport_error)
}

/// Decodes a successful JSON body or classifies the failure.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;
    if !status.is_success() {
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        return Err(classify(status.as_u16(), &body));
    }
    serde_json::from_slice(&bytes).map_err(|e| PortError::Malformed(e.to_string()))
}

/// Like `read_json`, for endpoints whose body is irrelevant.
pub async fn expect_success(response: Response) -> PortResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let bytes = response.bytes().await.map_err(transport_error)?;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Err(classify(status.as_u16(), &body))
}

pub fn transport_error(err: reqwest::Error) -> PortError {
    if err.is_timeout() {
        PortError::Timeout
    } else if err.is_decode() {
        PortError::Malformed(err.to_string())
    } else {
        PortError::Network(err.to_string())
    }
}

fn text_field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Maps a provider error response to a port error. Provider error codes win over
/// the HTTP status because the auth API reports most failures as 400/422.
pub fn classify(status: u16, body: &Value) -> PortError {
    let message = ["msg", "message", "error_description", "error"]
        .into_iter()
        .map(|field| text_field(body, field))
        .find(|text| !text.is_empty())
        .unwrap_or("no details")
        .to_string();
    let haystack = format!(
        "{} {} {} {}",
        text_field(body, "error_code"),
        text_field(body, "code"),
        text_field(body, "error"),
        message
    )
    .to_lowercase();

    if haystack.contains("user_already_exists") || haystack.contains("already registered") {
        return PortError::DuplicateAccount;
    }
    if haystack.contains("weak_password") || haystack.contains("password should") {
        return PortError::WeakPassword(message);
    }
    if haystack.contains("email_not_confirmed") || haystack.contains("email not confirmed") {
        return PortError::EmailNotConfirmed;
    }
    if haystack.contains("invalid_credentials")
        || haystack.contains("invalid_grant")
        || haystack.contains("invalid login credentials")
    {
        return PortError::InvalidCredentials;
    }

    match status {
        401 | 403 => PortError::Unauthorized,
        404 => PortError::NotFound(message),
        408 | 504 => PortError::Timeout,
        500..=599 => PortError::Network(format!("HTTP {status}: {message}")),
        _ => PortError::Unexpected(format!("HTTP {status}: {message}")),
    }
}
