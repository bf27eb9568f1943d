use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    config::AppContext,
    error::AuthError,
    info,
    management::Authenticator,
    server::start_callback_server,
    spotify::session::{Credentials, REQUIRED_SCOPES, Session, TokenGrant},
    types::{PkceState, TokenResponse},
    utils, warning,
};

/// Shared slot the callback handler fills once the login completes.
pub type SharedPkceState = Arc<Mutex<Option<PkceState>>>;

#[derive(Debug, Deserialize)]
struct AccountsErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

/// Client for the accounts service token endpoint.
///
/// Clone is cheap - the underlying `reqwest::Client` is shared.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    http: Client,
    token_url: String,
    client_id: String,
}

impl AccountsClient {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            http: ctx.http.clone(),
            token_url: ctx.config.token_url().to_string(),
            client_id: ctx.config.client_id().to_string(),
        }
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.post_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ])
        .await
    }

    /// Exchanges an authorization code for an access token using PKCE.
    ///
    /// The verifier proves the same client that started the flow is
    /// completing it. The redirect URI must match the one sent with the
    /// authorization request.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.post_form(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let res = self.http.post(&self.token_url).form(form).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<AccountsErrorBody>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => format!("status {status}"),
            };
            return Err(AuthError::GrantRejected(reason));
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::GrantRejected(format!("malformed token response: {e}")))
    }
}

#[async_trait]
impl TokenGrant for AccountsClient {
    async fn grant(
        &self,
        credentials: &Credentials,
        _scopes: &[&str],
    ) -> Result<TokenResponse, AuthError> {
        // Scopes are fixed when the refresh token is issued; the caller checks
        // what came back.
        self.refresh(&credentials.credentials).await
    }
}

/// Authenticator backed by the accounts service and a local callback listener.
pub struct SpotifyAuthenticator {
    accounts: AccountsClient,
    http: Client,
    api_url: String,
    auth_url: String,
    client_id: String,
    timeout: Duration,
    open_browser: bool,
}

impl SpotifyAuthenticator {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            accounts: AccountsClient::new(ctx),
            http: ctx.http.clone(),
            api_url: ctx.config.api_url().to_string(),
            auth_url: ctx.config.auth_url().to_string(),
            client_id: ctx.config.client_id().to_string(),
            timeout: ctx.config.oauth_timeout(),
            open_browser: true,
        }
    }

    /// Only print the authorization URL instead of also launching a browser.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Builds the URL the user visits to grant access.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        code_challenge: &str,
        state: &str,
    ) -> Result<Url, AuthError> {
        let scope = REQUIRED_SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("state", state),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| AuthError::Authorization(format!("invalid authorize URL: {e}")))
    }

    async fn fetch_username(&self, access_token: &str) -> Result<String, AuthError> {
        let user: CurrentUser = self
            .http
            .get(format!("{}/me", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(user.id)
    }
}

#[async_trait]
impl Authenticator for SpotifyAuthenticator {
    async fn connect(&self, credentials: Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;
        let session = Session::new(credentials, Arc::new(self.accounts.clone()));
        // A grant proves the credentials are still accepted.
        session.token(&[]).await?;
        Ok(session)
    }

    /// Runs the authorization-code flow with PKCE.
    ///
    /// 1. Generates a code verifier, its S256 challenge and a `state` value
    /// 2. Binds the callback listener on the redirect URI's address
    /// 3. Prints the authorization URL and opens it in a browser if possible
    /// 4. Waits until the callback handler stored a token, or the timeout hits
    /// 5. Looks up the user id the refresh token belongs to
    async fn authorize(&self, redirect_uri: &str) -> Result<Credentials, AuthError> {
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state();

        let (host, port) = callback_host(redirect_uri)?;
        let shared_state: SharedPkceState = Arc::new(Mutex::new(Some(PkceState {
            code_verifier,
            state: state.clone(),
            redirect_uri: redirect_uri.to_string(),
            token: None,
            failure: None,
        })));

        let (addr, server) = start_callback_server(
            &host,
            port,
            Arc::clone(&shared_state),
            self.accounts.clone(),
        )
        .await
        .map_err(|e| AuthError::Authorization(format!("cannot listen on {host}:{port}: {e}")))?;
        debug!(%addr, "waiting for the login callback");

        let auth_url = self.authorization_url(redirect_uri, &code_challenge, &state)?;
        info!("Click on the following link to login:\n{}", auth_url);
        if self.open_browser && webbrowser::open(auth_url.as_str()).is_err() {
            warning!("Failed to open browser. Please navigate to the URL above manually.");
        }

        let outcome = wait_for_token(Arc::clone(&shared_state), self.timeout).await;
        server.abort();

        let token = match outcome {
            Some(Ok(token)) => token,
            Some(Err(reason)) => return Err(AuthError::Authorization(reason)),
            None => return Err(AuthError::Timeout(self.timeout.as_secs())),
        };

        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            AuthError::Authorization("token response carried no refresh token".to_string())
        })?;
        let username = self.fetch_username(&token.access_token).await?;
        debug!(%username, "interactive login completed");

        Ok(Credentials::stored(username, refresh_token))
    }
}

/// Host and port the callback listener binds to, taken from the redirect URI.
fn callback_host(redirect_uri: &str) -> Result<(String, u16), AuthError> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| AuthError::Authorization(format!("invalid redirect URI: {e}")))?;
    // IPv6 literals come back bracketed.
    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
        .ok_or_else(|| AuthError::Authorization("redirect URI has no host".to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| AuthError::Authorization("redirect URI has no port".to_string()))?;
    Ok((host, port))
}

/// Waits for the callback handler to record a token or a failure.
///
/// Polls the shared state once a second until `max_wait` elapses; returns
/// `None` on timeout.
async fn wait_for_token(
    shared_state: SharedPkceState,
    max_wait: Duration,
) -> Option<Result<TokenResponse, String>> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce) = lock.as_ref() {
            if let Some(token) = &pkce.token {
                return Some(Ok(token.clone()));
            }
            if let Some(failure) = &pkce.failure {
                warn!(%failure, "authorization callback reported a failure");
                return Some(Err(failure.clone()));
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
