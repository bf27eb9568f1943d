use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};
use tracing::warn;

use crate::spotify::auth::{AccountsClient, SharedPkceState};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedPkceState>,
    Extension(accounts): Extension<AccountsClient>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(pkce_state) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if params.get("state") != Some(&pkce_state.state) {
        // Stray or forged request; keep waiting for the real redirect.
        return Html("<h4>State mismatch.</h4>");
    }

    if let Some(reason) = params.get("error") {
        pkce_state.failure = Some(format!("authorization denied: {reason}"));
        return Html("<h4>Login failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match accounts
        .exchange_code(code, &pkce_state.code_verifier, &pkce_state.redirect_uri)
        .await
    {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warn!(error = %e, "token exchange failed");
            pkce_state.failure = Some(e.to_string());
            Html("<h4>Login failed.</h4>")
        }
    }
}
