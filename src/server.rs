use axum::{Extension, Router, routing::get};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{
    api,
    spotify::auth::{AccountsClient, SharedPkceState},
};

/// Binds the login callback listener and serves it on a background task.
///
/// `host` may be an IP literal or a name such as `localhost`. Binding happens
/// before this returns so an occupied port surfaces as an error instead of a
/// silent hang. Returns the bound address; abort the handle once the flow is
/// over.
pub async fn start_callback_server(
    host: &str,
    port: u16,
    state: SharedPkceState,
    accounts: AccountsClient,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let app = Router::new()
        .route("/login", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(accounts));

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    debug!(%addr, "login callback listener bound");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "login callback listener stopped");
        }
    });
    Ok((addr, handle))
}
