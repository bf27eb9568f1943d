//! Session establishment.
//!
//! [`SessionManager::establish`] tries a fixed, ordered list of login
//! strategies and keeps the first session that comes out of one:
//!
//! 1. **Stored** - the credential blob, when persistence is on and the file exists
//! 2. **Explicit** - a username and token given on the command line
//! 3. **Interactive** - the authorization-code flow through a local callback
//!
//! Each strategy runs at most once. A failing strategy is recorded and the next
//! one is tried; when all of them fail the recorded reasons are returned in
//! [`AuthError::NoStrategySucceeded`].
//!
//! The credential store is touched exactly once per call: it is read when a
//! blob exists, written when persistence is on and no blob existed, and left
//! alone otherwise.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{AuthError, StrategyFailure},
    management::CredentialStore,
    spotify::{Credentials, Session},
};

/// The session library seam: turns credentials into sessions and runs the
/// interactive login.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Builds a live session from login material.
    async fn connect(&self, credentials: Credentials) -> Result<Session, AuthError>;

    /// Runs the interactive flow and returns the login material it produced.
    async fn authorize(&self, redirect_uri: &str) -> Result<Credentials, AuthError>;
}

/// Optional explicit login supplied by the user.
#[derive(Debug, Clone, Default)]
pub struct LoginHint {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl LoginHint {
    pub fn new(username: Option<String>, token: Option<String>) -> Self {
        Self { username, token }
    }

    /// Both parts, when neither is missing or blank.
    fn explicit(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.trim().is_empty())?;
        let token = self.token.as_deref().filter(|t| !t.trim().is_empty())?;
        Some((username, token))
    }
}

#[derive(Debug)]
enum Strategy<'h> {
    Stored,
    Explicit { username: &'h str, token: &'h str },
    Interactive,
}

impl Strategy<'_> {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Stored => "stored credentials",
            Strategy::Explicit { .. } => "username and token",
            Strategy::Interactive => "interactive login",
        }
    }
}

pub struct SessionManager<'a> {
    config: &'a Config,
    store: CredentialStore,
    authenticator: &'a dyn Authenticator,
}

impl<'a> SessionManager<'a> {
    pub fn new(config: &'a Config, authenticator: &'a dyn Authenticator) -> Self {
        Self {
            config,
            store: CredentialStore::new(config.credentials_location().clone()),
            authenticator,
        }
    }

    pub async fn establish(&self, hint: &LoginHint) -> Result<Session, AuthError> {
        let persistence = self.config.save_credentials();
        let stored_exists = persistence && self.store.exists().await;
        let persist_new = persistence && !stored_exists;

        let mut failures = Vec::new();
        for strategy in plan(hint, stored_exists) {
            match self.attempt(&strategy).await {
                Ok(session) => {
                    debug!(strategy = strategy.name(), "session established");
                    if persist_new {
                        self.persist(&session).await;
                    }
                    return Ok(session);
                }
                Err(error) => {
                    debug!(strategy = strategy.name(), %error, "login strategy failed");
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        error,
                    });
                }
            }
        }

        Err(AuthError::NoStrategySucceeded(failures))
    }

    async fn attempt(&self, strategy: &Strategy<'_>) -> Result<Session, AuthError> {
        match strategy {
            Strategy::Stored => {
                let credentials = self
                    .store
                    .load()
                    .await
                    .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
                self.authenticator.connect(credentials).await
            }
            Strategy::Explicit { username, token } => {
                let payload = Credentials::stored(*username, *token).to_stored_bytes()?;
                let credentials = Credentials::from_stored_bytes(&payload)?;
                self.authenticator.connect(credentials).await
            }
            Strategy::Interactive => {
                let credentials = self
                    .authenticator
                    .authorize(&self.config.redirect_uri())
                    .await?;
                self.authenticator.connect(credentials).await
            }
        }
    }

    async fn persist(&self, session: &Session) {
        match self.store.persist(&session.credentials()).await {
            Ok(()) => debug!(path = %self.store.path().display(), "credentials saved"),
            Err(e) => warn!(error = %e, "could not save credentials; next run will log in again"),
        }
    }
}

fn plan(hint: &LoginHint, stored_exists: bool) -> Vec<Strategy<'_>> {
    let mut strategies = Vec::with_capacity(3);
    if stored_exists {
        strategies.push(Strategy::Stored);
    }
    if let Some((username, token)) = hint.explicit() {
        strategies.push(Strategy::Explicit { username, token });
    }
    strategies.push(Strategy::Interactive);
    strategies
}
