//! crates/hogarzen_core/src/auth.rs
//!
//! The Session/Auth Manager: owns the current-user state, talks to the hosted
//! auth provider through `AuthBackend` and is the only writer of the session
//! storage.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Session, User};
use crate::error::{AppError, AppResult, AuthErrorKind};
use crate::ports::{AuthBackend, PortError, RemoteSession, Retention, SessionStorage};
use crate::validation::{validate_login_form, validate_register_form, RegisterForm};

pub const AUTH_TOKEN_KEY: &str = "hz_auth_token";
pub const USER_KEY: &str = "hz_user";
pub const REMEMBER_ME_KEY: &str = "hz_remember_me";
pub const COOKIE_CONSENT_KEY: &str = "hz_cookie_consent";

/// Retention of "remember me" sessions and of the consent flag.
pub const LONG_LIVED: Duration = Duration::from_secs(365 * 24 * 60 * 60);

//=========================================================================================
// State Machine
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

#[derive(Debug, Clone)]
pub enum AuthEvent {
    Started,
    Succeeded(Session),
    Failed,
    SignedOut,
    TokenRejected,
}

impl AuthState {
    /// Pure transition function. Events that make no sense in the current state
    /// leave it unchanged.
    pub fn next(&self, event: AuthEvent) -> AuthState {
        match (self, event) {
            (AuthState::Anonymous | AuthState::Authenticated(_), AuthEvent::Started) => {
                AuthState::Authenticating
            }
            (AuthState::Authenticating, AuthEvent::Succeeded(session)) => {
                AuthState::Authenticated(session)
            }
            (AuthState::Authenticating, AuthEvent::Failed) => AuthState::Anonymous,
            (_, AuthEvent::SignedOut | AuthEvent::TokenRejected) => AuthState::Anonymous,
            (state, _) => state.clone(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Identifies the session a piece of work was started under. Work whose ticket
/// is no longer current must be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    pub user_id: Uuid,
    pub token: String,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Inner {
    state: AuthState,
    /// Bumped whenever the held session changes.
    generation: u64,
}

//=========================================================================================
// AuthManager
//=========================================================================================

pub struct AuthManager {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    inner: RwLock<Inner>,
}

impl AuthManager {
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            backend,
            storage,
            inner: RwLock::new(Inner::default()),
        }
    }

    async fn transition(&self, event: AuthEvent) -> AuthState {
        let mut inner = self.inner.write().await;
        let next = inner.state.next(event);
        if inner.state.session() != next.session() {
            inner.generation += 1;
        }
        inner.state = next.clone();
        next
    }

    /// Moves `Authenticating` to `Authenticated` and persists the session. Fails if
    /// the attempt was superseded (e.g. a logout arrived while it was in flight).
    async fn complete(&self, session: Session) -> AppResult<User> {
        match self.transition(AuthEvent::Succeeded(session)).await {
            AuthState::Authenticated(session) => {
                self.persist(&session)?;
                Ok(session.user)
            }
            _ => Err(AppError::Auth(AuthErrorKind::NotAuthenticated)),
        }
    }

    fn persist(&self, session: &Session) -> AppResult<()> {
        let retention = if session.remember_me {
            Retention::Persistent(LONG_LIVED)
        } else {
            Retention::Session
        };
        let profile = serde_json::to_string(&session.user)
            .map_err(|e| AppError::Unknown(format!("failed to serialize user: {e}")))?;
        self.storage.set(AUTH_TOKEN_KEY, &session.token, retention);
        self.storage.set(USER_KEY, &profile, retention);
        self.storage.set(
            REMEMBER_ME_KEY,
            if session.remember_me { "true" } else { "false" },
            retention,
        );
        Ok(())
    }

    fn clear_storage(&self) {
        for key in [AUTH_TOKEN_KEY, USER_KEY, REMEMBER_ME_KEY] {
            self.storage.remove(key);
        }
    }

    /// A failed attempt leaves no session behind, in memory or in storage, even
    /// if one was held before it started.
    async fn abandon_attempt(&self) {
        self.transition(AuthEvent::Failed).await;
        self.clear_storage();
    }

    fn session_from(remote: RemoteSession, remember_me: bool) -> Session {
        Session {
            token: remote.access_token,
            user: remote.user,
            expires_at: remote.expires_at,
            remember_me,
        }
    }

    // --- Operations ---

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> AppResult<User> {
        validate_register_form(&RegisterForm::unconfirmed(name, email, password))?;

        self.transition(AuthEvent::Started).await;
        let outcome = match self
            .backend
            .sign_up(name.trim(), email.trim(), password)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.abandon_attempt().await;
                warn!(error = %e, "Registration failed");
                return Err(e.into());
            }
        };

        match outcome.session {
            Some(remote) => {
                let user = self.complete(Self::session_from(remote, remember_me)).await?;
                info!(user_id = %user.id, "User registered");
                Ok(user)
            }
            None => {
                self.abandon_attempt().await;
                info!(user_id = %outcome.user.id, "User registered, awaiting email confirmation");
                Err(AppError::Auth(AuthErrorKind::EmailNotConfirmed))
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> AppResult<User> {
        validate_login_form(email, password)?;

        self.transition(AuthEvent::Started).await;
        match self.backend.sign_in(email.trim(), password).await {
            Ok(remote) => {
                let user = self.complete(Self::session_from(remote, remember_me)).await?;
                info!(user_id = %user.id, remember_me, "User logged in");
                Ok(user)
            }
            Err(e) => {
                self.abandon_attempt().await;
                warn!(error = %e, "Login failed");
                Err(e.into())
            }
        }
    }

    /// Always ends the local session, even when the provider cannot be reached.
    pub async fn logout(&self) {
        let token = self
            .ticket()
            .await
            .map(|ticket| ticket.token)
            .or_else(|| self.storage.get(AUTH_TOKEN_KEY));

        self.transition(AuthEvent::SignedOut).await;
        self.clear_storage();

        if let Some(token) = token {
            if let Err(e) = self.backend.sign_out(&token).await {
                warn!(error = %e, "Remote sign-out failed; local session cleared anyway");
            }
        }
        info!("User logged out");
    }

    /// Rebuilds the session from storage, re-validating the token with the provider.
    pub async fn restore_session(&self) -> Option<User> {
        if let Some(user) = self.current_user().await {
            return Some(user);
        }

        let token = self.storage.get(AUTH_TOKEN_KEY)?;
        let cached: Option<User> = self
            .storage
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        let Some(cached) = cached else {
            debug!("Stored session has no readable profile; clearing it");
            self.clear_storage();
            return None;
        };
        let remember_me = self.storage.get(REMEMBER_ME_KEY).as_deref() == Some("true");

        self.transition(AuthEvent::Started).await;
        let user = match self.backend.get_user(&token).await {
            Ok(user) => user,
            Err(PortError::Unauthorized | PortError::InvalidCredentials | PortError::NotFound(_)) => {
                self.abandon_attempt().await;
                info!("Stored session is no longer valid; cleared");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not validate stored session; using cached profile");
                cached.clone()
            }
        };

        let refreshed = user != cached;
        let session = Session {
            token,
            user,
            expires_at: None,
            remember_me,
        };
        match self.transition(AuthEvent::Succeeded(session)).await {
            AuthState::Authenticated(session) => {
                if refreshed {
                    if let Err(e) = self.persist(&session) {
                        warn!(error = %e, "Failed to refresh stored profile");
                    }
                }
                Some(session.user)
            }
            _ => None,
        }
    }

    /// Re-authentication path for callers whose token was rejected mid-operation.
    pub async fn expire_session(&self) {
        self.transition(AuthEvent::TokenRejected).await;
        self.clear_storage();
        warn!("Session expired; user must sign in again");
    }

    pub fn set_cookie_consent(&self, accepted: bool) {
        self.storage.set(
            COOKIE_CONSENT_KEY,
            if accepted { "true" } else { "false" },
            Retention::Persistent(LONG_LIVED),
        );
    }

    pub fn cookie_consent(&self) -> Option<bool> {
        self.storage
            .get(COOKIE_CONSENT_KEY)
            .map(|value| value == "true")
    }

    // --- Read accessors ---

    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner
            .read()
            .await
            .state
            .session()
            .map(|session| session.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.state.is_authenticated()
    }

    pub async fn ticket(&self) -> Option<SessionTicket> {
        let inner = self.inner.read().await;
        inner.state.session().map(|session| SessionTicket {
            user_id: session.user.id,
            token: session.token.clone(),
            generation: inner.generation,
        })
    }

    pub async fn is_current(&self, ticket: &SessionTicket) -> bool {
        let inner = self.inner.read().await;
        inner.state.is_authenticated() && inner.generation == ticket.generation
    }
}
