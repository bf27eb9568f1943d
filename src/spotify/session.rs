//! Authenticated session handle and the bearer tokens derived from it.
//!
//! A [`Session`] owns the reusable login material ([`Credentials`]). Nothing
//! outside this module reads that material; callers ask the session for an
//! [`AuthToken`] through a [`TokenProvider`] instead. Tokens are re-derived on
//! every request and never written anywhere.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::AuthError,
    types::{AuthenticationType, TokenResponse},
};

pub const USER_READ_EMAIL: &str = "user-read-email";
pub const PLAYLIST_READ_PRIVATE: &str = "playlist-read-private";
pub const USER_LIBRARY_READ: &str = "user-library-read";
pub const USER_FOLLOW_READ: &str = "user-follow-read";

/// Scopes every catalog request token must carry.
pub const REQUIRED_SCOPES: [&str; 4] = [
    USER_READ_EMAIL,
    PLAYLIST_READ_PRIVATE,
    USER_LIBRARY_READ,
    USER_FOLLOW_READ,
];

/// Reusable login material, in the shape persisted to the credential file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub credentials: String,
    #[serde(rename = "type")]
    pub auth_type: AuthenticationType,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("credentials", &"<redacted>")
            .field("auth_type", &self.auth_type)
            .finish()
    }
}

impl Credentials {
    pub fn stored(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            credentials: secret.into(),
            auth_type: AuthenticationType::StoredSpotifyCredentials,
        }
    }

    /// Encodes the credentials as base64 of their JSON form.
    pub fn to_stored_bytes(&self) -> Result<Vec<u8>, AuthError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        Ok(STANDARD.encode(json).into_bytes())
    }

    /// Reverses [`Credentials::to_stored_bytes`].
    pub fn from_stored_bytes(bytes: &[u8]) -> Result<Self, AuthError> {
        let json = STANDARD
            .decode(bytes)
            .map_err(|e| AuthError::InvalidCredentials(format!("not base64: {e}")))?;
        let credentials: Self = serde_json::from_slice(&json)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.credentials.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "credential secret is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Exchanges login material for a freshly minted access token.
#[async_trait]
pub trait TokenGrant: Send + Sync {
    async fn grant(
        &self,
        credentials: &Credentials,
        scopes: &[&str],
    ) -> Result<TokenResponse, AuthError>;
}

/// Short-lived bearer token.
#[derive(Clone)]
pub struct AuthToken {
    access_token: String,
    scopes: Vec<String>,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>, scopes: Vec<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            scopes,
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// An authenticated session.
///
/// The login material is only mutated when the accounts service rotates the
/// refresh token during a grant.
pub struct Session {
    credentials: Mutex<Credentials>,
    grant: Arc<dyn TokenGrant>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(credentials: Credentials, grant: Arc<dyn TokenGrant>) -> Self {
        Self {
            credentials: Mutex::new(credentials),
            grant,
        }
    }

    pub fn username(&self) -> String {
        self.snapshot().username
    }

    /// Copy of the login material, for the credential store only.
    pub(crate) fn credentials(&self) -> Credentials {
        self.snapshot()
    }

    fn snapshot(&self) -> Credentials {
        match self.credentials.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Derives a token that carries every scope in `scopes`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingScopes`] when the grant succeeds but leaves
    /// out one of the requested scopes, or the grant's own error when the
    /// session has been revoked.
    pub async fn token(&self, scopes: &[&str]) -> Result<AuthToken, AuthError> {
        let credentials = self.snapshot();
        let response = self.grant.grant(&credentials, scopes).await?;

        if let Some(rotated) = response.refresh_token.as_ref() {
            if *rotated != credentials.credentials {
                debug!(username = %credentials.username, "refresh token rotated");
                let mut guard = match self.credentials.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                guard.credentials = rotated.clone();
            }
        }

        let granted: Vec<String> = response
            .scope
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let missing: Vec<String> = scopes
            .iter()
            .filter(|s| !granted.iter().any(|g| g == *s))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingScopes(missing));
        }

        let expires_at = i64::try_from(response.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::GrantRejected(format!(
                    "token lifetime out of range: {} seconds",
                    response.expires_in
                ))
            })?;
        Ok(AuthToken::new(response.access_token, granted, expires_at))
    }
}

/// Anything that can hand out bearer tokens for catalog requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer(&self) -> Result<AuthToken, AuthError>;
}

/// Derives [`REQUIRED_SCOPES`] tokens from a session, with no caching.
#[derive(Clone)]
pub struct TokenProvider {
    session: Arc<Session>,
}

impl TokenProvider {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub async fn derive_token(&self) -> Result<AuthToken, AuthError> {
        self.session.token(&REQUIRED_SCOPES).await
    }
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn bearer(&self) -> Result<AuthToken, AuthError> {
        self.derive_token().await
    }
}
