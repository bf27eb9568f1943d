//! # API Module
//!
//! HTTP endpoints served by the short-lived local listener that completes the
//! interactive login.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the authorization server's redirect on `/login`,
//!   checks the `state` value, and exchanges the authorization code for tokens
//!   using the PKCE verifier generated at the start of the flow. The result,
//!   success or failure, is written into the shared state the login flow polls.
//!
//! The listener only exists while [`crate::spotify::auth::SpotifyAuthenticator`]
//! waits for a login; see [`crate::server::start_callback_server`].
//!
//! ## Security Considerations
//!
//! - The PKCE flow never needs a client secret
//! - Requests whose `state` does not match are ignored
//! - Token material never appears in the rendered pages

mod callback;

pub use callback::callback;
