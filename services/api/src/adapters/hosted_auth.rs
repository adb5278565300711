//! services/api/src/adapters/hosted_auth.rs
//!
//! The hosted auth adapter, the concrete implementation of the `AuthBackend` port.
//! It speaks the GoTrue-style REST API exposed under `/auth/v1`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hogarzen_core::domain::User;
use hogarzen_core::ports::{AuthBackend, PortResult, RemoteSession, SignUpOutcome};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::hosted::{expect_success, read_json, send, HostedApi};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HostedAuthAdapter {
    api: HostedApi,
}

impl HostedAuthAdapter {
    pub fn new(api: HostedApi) -> Self {
        Self { api }
    }
}

//=========================================================================================
// Provider Payloads
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    user_metadata: UserMetadata,
}
impl UserRecord {
    fn to_domain(self) -> User {
        let email = self.email.unwrap_or_default();
        // Accounts created outside the app may lack a display name.
        let name = self
            .user_metadata
            .name
            .or(self.user_metadata.full_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        User {
            id: self.id,
            name,
            email,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionRecord {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserRecord,
}
impl SessionRecord {
    fn to_domain(self) -> RemoteSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));
        RemoteSession {
            access_token: self.access_token,
            expires_at,
            user: self.user.to_domain(),
        }
    }
}

/// Signup answers with a session when accounts are auto-confirmed and with the bare
/// user when an email confirmation is still pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpRecord {
    Session(SessionRecord),
    User(UserRecord),
}
impl SignUpRecord {
    fn to_domain(self) -> SignUpOutcome {
        match self {
            SignUpRecord::Session(session) => {
                let session = session.to_domain();
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpRecord::User(user) => SignUpOutcome {
                user: user.to_domain(),
                session: None,
            },
        }
    }
}

//=========================================================================================
// `AuthBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthBackend for HostedAuthAdapter {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        let request = self.api.request(Method::POST, "/auth/v1/signup", None)?.json(&json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        }));
        let record: SignUpRecord = read_json(send(request).await?).await?;
        Ok(record.to_domain())
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<RemoteSession> {
        let request = self
            .api
            .request(Method::POST, "/auth/v1/token?grant_type=password", None)?
            .json(&json!({ "email": email, "password": password }));
        let record: SessionRecord = read_json(send(request).await?).await?;
        Ok(record.to_domain())
    }

    async fn sign_out(&self, token: &str) -> PortResult<()> {
        let request = self.api.request(Method::POST, "/auth/v1/logout", Some(token))?;
        expect_success(send(request).await?).await
    }

    async fn get_user(&self, token: &str) -> PortResult<User> {
        let request = self.api.request(Method::GET, "/auth/v1/user", Some(token))?;
        let record: UserRecord = read_json(send(request).await?).await?;
        Ok(record.to_domain())
    }
}
