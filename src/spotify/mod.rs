//! # Spotify Integration Module
//!
//! This module is the authenticated request pipeline between spotgrab and the
//! Spotify services. It owns everything from turning login material into a
//! session, through bearer-token derivation and retrying catalog requests, up
//! to walking paginated list endpoints.
//!
//! ## Architecture
//!
//! ```text
//! Session Manager (crate::management)
//!          ↓
//! Session + Token Provider   [`session`]
//!          ↓
//! API Client                 [`client`]
//!          ↓
//! Paginated Fetcher          [`pagination`]
//!          ↓
//! Catalog queries            [`catalog`]  →  Download Orchestrator (crate::download)
//! ```
//!
//! Each layer needs the one below it to succeed; there is no layer skipping.
//!
//! ## Core Modules
//!
//! ### Authentication
//!
//! [`auth`] - Accounts service client and the interactive login:
//! - **Refresh Grant**: Trades the stored refresh token for an access token
//! - **PKCE Flow**: S256 challenge, random `state`, local callback on port 4381
//! - **Browser Integration**: Opens the authorization URL when a browser is available
//!
//! ### Session and Tokens
//!
//! [`session`] - The [`Session`] handle and the [`TokenProvider`]:
//! - **Opaque Credentials**: Login material never leaves the session except to
//!   be persisted by the credential store
//! - **Scope Check**: Every token must carry the four scopes in [`REQUIRED_SCOPES`]
//! - **No Caching**: A token is derived for every request
//!
//! ### Catalog Requests
//!
//! [`client`] - The [`ApiClient`]:
//! - **Fixed Header Set**: Bearer token, language, JSON accept type, client identity
//! - **Classification**: Non-JSON and empty bodies, `error` payloads
//! - **Bounded Retry**: `retry_attempts` total attempts, fixed 5 second pause
//! - **Fail Soft**: Exhausted retries hand back the error payload as data
//!
//! ### Pagination
//!
//! [`pagination`] - The [`Paginator`]:
//! - **Offset Mode**: `limit`/`offset` pages of 50 until a short page
//! - **Cursor Mode**: Follows the opaque `next` link until it is null
//! - **Order**: Items keep server order within and across pages
//!
//! ### Catalog Queries
//!
//! [`catalog`] - Album, artist and track lookups used by the orchestrator,
//! localized with the configured locale.
//!
//! ## Error Handling
//!
//! - **Auth failures** are fatal and returned as [`crate::error::AuthError`]
//! - **API-level failures** are retried, then returned as data by the client;
//!   the paginator and catalog queries turn a leftover `error` payload into
//!   [`crate::error::Error::Api`]
//! - **Transport failures** are returned right away
//!
//! ## Concurrency
//!
//! Requests are issued one after another. The only shared state is the
//! session, which token derivation reads.

pub mod auth;
pub mod catalog;
pub mod client;
pub mod pagination;
pub mod session;

pub use auth::{AccountsClient, SpotifyAuthenticator};
pub use catalog::Catalog;
pub use client::{ApiClient, ApiResponse};
pub use pagination::Paginator;
pub use session::{AuthToken, Credentials, REQUIRED_SCOPES, Session, TokenProvider, TokenSource};
