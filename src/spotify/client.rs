//! Authenticated GET requests against the catalog Web API.
//!
//! Every request carries a freshly derived bearer token and the same header
//! set. Responses are classified as either usable or an API-level failure:
//!
//! - a body that is not JSON is replaced by the sentinel
//!   `{"error": {"status": "unknown", "message": "received an empty response"}}`
//! - an empty JSON value, or an object with an `error` member, is a failure
//!
//! Failures are retried up to `retry_attempts - 1` more times with a fixed
//! delay between attempts. Once the attempts are used up the last response is
//! returned unchanged, error payload included; the client never turns an
//! API-level failure into an `Err`. Callers inspect [`ApiResponse::error`].
//!
//! Transport failures (connection refused, timeouts, unreadable bodies) and
//! token derivation failures are not API-level failures and are returned as
//! errors right away.

use std::{sync::Arc, time::Duration};

use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::{
    Res,
    config::AppContext,
    error::ApiError,
    spotify::session::TokenSource,
    utils,
};

/// Fixed pause between two attempts of the same request.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

pub const CLIENT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv=136.0) Gecko/20100101 Firefox/136.0";
pub const APP_PLATFORM: &str = "WebPlayer";

/// Raw body and parsed JSON of one catalog response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub text: String,
    pub json: Value,
}

impl ApiResponse {
    fn from_body(text: String) -> Self {
        let json = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| empty_response_error());
        Self { text, json }
    }

    /// `true` when the body is empty or carries an `error` member.
    pub fn is_failure(&self) -> bool {
        utils::is_empty_json(&self.json) || self.json.get("error").is_some()
    }

    /// The API error this response represents, if any.
    pub fn error(&self) -> Option<ApiError> {
        if let Some(err) = ApiError::from_payload(&self.json) {
            return Some(err);
        }
        if utils::is_empty_json(&self.json) {
            return Some(ApiError {
                status: "unknown".to_string(),
                message: "received an empty response".to_string(),
            });
        }
        None
    }
}

fn empty_response_error() -> Value {
    json!({
        "error": {
            "status": "unknown",
            "message": "received an empty response"
        }
    })
}

/// Catalog API client.
///
/// Clone is cheap; the token source and HTTP client are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    api_url: String,
    language: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ApiClient {
    pub fn new(ctx: &AppContext, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http: ctx.http.clone(),
            tokens,
            api_url: ctx.config.api_url().to_string(),
            language: ctx.config.language().to_string(),
            retry_attempts: ctx.config.retry_attempts().max(1),
            retry_delay: RETRY_DELAY,
        }
    }

    /// Overrides the pause between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Base URL of the catalog API, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetches `url` as-is, retrying API-level failures.
    pub async fn invoke(&self, url: &str) -> Res<ApiResponse> {
        self.invoke_query(url, &[]).await
    }

    /// Fetches one page of a list endpoint.
    ///
    /// `limit` and `offset` are sent as query parameters together with
    /// `extra`. Returns the parsed JSON, which may be an error payload.
    pub async fn invoke_with_params(
        &self,
        url: &str,
        limit: u32,
        offset: u32,
        extra: &[(&str, &str)],
    ) -> Res<Value> {
        let mut query: Vec<(String, String)> = vec![
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        query.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        Ok(self.invoke_query(url, &query).await?.json)
    }

    async fn invoke_query(&self, url: &str, query: &[(String, String)]) -> Res<ApiResponse> {
        let mut attempt: u32 = 0;

        loop {
            let response = self.fetch_once(url, query).await?;
            let Some(err) = response.error() else {
                return Ok(response);
            };

            if attempt + 1 < self.retry_attempts {
                attempt += 1;
                warn!(
                    try_count = attempt,
                    status = %err.status,
                    message = %err.message,
                    %url,
                    "Spotify API error, retrying"
                );
                sleep(self.retry_delay).await;
                continue;
            }

            error!(status = %err.status, message = %err.message, %url, "Spotify API error");
            return Ok(response);
        }
    }

    async fn fetch_once(&self, url: &str, query: &[(String, String)]) -> Res<ApiResponse> {
        let token = self.tokens.bearer().await?;

        let res = self
            .http
            .get(url)
            .bearer_auth(token.access_token())
            .header(ACCEPT_LANGUAGE, self.language.as_str())
            .header(ACCEPT, "application/json")
            .header("app-platform", APP_PLATFORM)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(query)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        debug!(%url, %status, bytes = text.len(), "catalog response");

        Ok(ApiResponse::from_body(text))
    }
}
