pub mod provider;
pub mod store;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

pub use provider::{Credentials, HttpIdentityProvider, IdentityProvider};
pub use store::SessionStore;

/// Where unauthenticated views send the user
pub const ENTRY_ROUTE: &str = "/";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// An authenticated admin session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub user_id: Option<String>,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
    iat: Option<i64>,
    sub: Option<String>,
    user_id: Option<String>,
}

/// Read claims without checking the signature; the identity provider owns verification
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

impl Session {
    /// Build a session from provider credentials.
    ///
    /// Expiry comes from the token's `exp` claim, then the provider's
    /// `expires_in`, then the configured fallback.
    pub fn from_credentials(email: impl Into<String>, credentials: Credentials, now: DateTime<Utc>) -> Self {
        let claims = decode_claims(&credentials.token);

        let issued_at = claims
            .as_ref()
            .and_then(|c| c.iat)
            .and_then(|iat| DateTime::from_timestamp(iat, 0))
            .unwrap_or(now);

        let expires_at = claims
            .as_ref()
            .and_then(|c| c.exp)
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
            .or_else(|| credentials.expires_in.map(|secs| now + Duration::seconds(secs)))
            .unwrap_or_else(|| now + Duration::hours(config::config().session.fallback_expiry_hours));

        let user_id = credentials.user_id.or_else(|| {
            claims.and_then(|c| c.user_id.or(c.sub))
        });

        Self {
            email: email.into(),
            user_id,
            token: credentials.token,
            issued_at,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Holds the current session, if any. Replaces loose "logged in" flags with
/// one explicit `Option<Session>`.
#[derive(Debug, Default)]
pub struct SessionGuard {
    session: Option<Session>,
    store: Option<SessionStore>,
}

impl SessionGuard {
    /// Anonymous guard with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session: Some(session),
            store: None,
        }
    }

    /// Guard backed by a session file; picks up a previously saved session
    pub fn with_store(store: SessionStore) -> Result<Self, SessionError> {
        let session = store.load()?;
        Ok(Self {
            session,
            store: Some(store),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.session.as_ref().map_or(false, |s| !s.is_expired_at(now))
    }

    /// The current session while it is still valid
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref().filter(|s| !s.is_expired_at(Utc::now()))
    }

    pub async fn login<P>(&mut self, provider: &P, email: &str, password: &str) -> Result<&Session, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::InvalidCredentials(
                "Email and password are required".to_string(),
            ));
        }

        let credentials = provider.sign_in(email, password).await?;
        let session = Session::from_credentials(email, credentials, Utc::now());

        if let Some(store) = &self.store {
            store.save(&session)?;
        }
        tracing::info!("Signed in as {} until {}", session.email, session.expires_at);

        Ok(self.session.insert(session))
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        if let Some(session) = self.session.take() {
            tracing::info!("Signed out {}", session.email);
        }
        Ok(())
    }
}
