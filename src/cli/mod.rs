//! # CLI Module
//!
//! This module provides the command-line layer of spotgrab. Each command
//! builds what it needs from the shared [`crate::config::AppContext`], runs
//! the request pipeline, and reports to the user.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`login`] - Establishes a session through the strategy chain (stored
//!   credentials, username and token, interactive login) and saves the
//!   credentials when persistence is enabled
//! - [`logout`] - Removes the stored credential file
//!
//! ### Downloads
//!
//! - [`download`] - Resolves a single track, an album, or every album and
//!   single of an artist down to each track's localized metadata; prints the
//!   resulting plan as a table
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Credentials, Session)
//!     ↓
//! Download Layer (Orchestration)
//!     ↓
//! Spotify Layer (Tokens, Requests, Pagination)
//! ```
//!
//! ## Error Handling
//!
//! Commands return [`crate::Res`]; `main` prints the error and exits non-zero.
//! API errors that survive the client's retries are already logged as they
//! happen, so the final message only names what stopped the command.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotgrab login                                   # Log in and save credentials
//! spotgrab track spotify:track:11dFghVXANMlKmJXsNCbNl # Resolve one track
//! spotgrab album 4aawyAB9vmqN3uQ7FjRGTy            # Resolve an album
//! spotgrab artist https://open.spotify.com/artist/0TnOYISbd1XYRBk9myaseg
//! spotgrab --username me --token AQ... album ...   # Log in with a stored token
//! spotgrab logout
//! ```

mod auth;
mod download;

pub use auth::login;
pub use auth::logout;
pub use download::Target;
pub use download::download;
