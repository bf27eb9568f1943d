//! Shared fixtures for the integration tests.
//!
//! Builds a [`Config`] pointed at a wiremock server and a token source that
//! never talks to the accounts service.

#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use spotgrab::{
    config::{AppContext, Config},
    error::AuthError,
    spotify::{ApiClient, AuthToken, TokenSource},
};

pub const TEST_TOKEN: &str = "test-access-token";

/// Hands out the same bearer token and counts how often it was asked.
#[derive(Default)]
pub struct StaticTokens {
    pub calls: AtomicUsize,
}

impl StaticTokens {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for StaticTokens {
    async fn bearer(&self) -> Result<AuthToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthToken::new(
            TEST_TOKEN,
            Vec::new(),
            Utc::now() + chrono::Duration::hours(1),
        ))
    }
}

/// A revoked session.
pub struct RevokedTokens;

#[async_trait]
impl TokenSource for RevokedTokens {
    async fn bearer(&self) -> Result<AuthToken, AuthError> {
        Err(AuthError::GrantRejected("Refresh token revoked".to_string()))
    }
}

pub fn config(api_url: &str, retry_attempts: u32, extra: &[(&str, &str)]) -> Config {
    let api_url = api_url.to_string();
    let attempts = retry_attempts.to_string();
    let extra: Vec<(String, String)> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Config::from_lookup(|key| match key {
        "SPOTGRAB_API_URL" => Some(api_url.clone()),
        "SPOTGRAB_RETRY_ATTEMPTS" => Some(attempts.clone()),
        other => extra
            .iter()
            .find(|(k, _)| k == other)
            .map(|(_, v)| v.clone()),
    })
    .expect("valid test config")
}

pub fn client_with(
    api_url: &str,
    retry_attempts: u32,
    tokens: Arc<dyn TokenSource>,
) -> (AppContext, ApiClient) {
    let ctx = AppContext::new(config(api_url, retry_attempts, &[])).expect("http client");
    let client = ApiClient::new(&ctx, tokens).with_retry_delay(Duration::ZERO);
    (ctx, client)
}

pub fn client(api_url: &str, retry_attempts: u32) -> (AppContext, ApiClient) {
    client_with(api_url, retry_attempts, Arc::new(StaticTokens::default()))
}
