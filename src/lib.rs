//! spotgrab library
//!
//! This library implements an authenticated client for the Spotify catalog:
//! session establishment and persistence, scoped bearer tokens, retrying
//! catalog requests, pagination over list endpoints, and the orchestration of
//! album and artist downloads on top of them.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local login callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loading and the shared application context
//! - `download` - Album and artist download orchestration
//! - `error` - Error types
//! - `management` - Credential persistence and session establishment
//! - `server` - Local HTTP listener for the login callback
//! - `spotify` - Spotify accounts and Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spotgrab::{config, management, spotify};
//!
//! #[tokio::main]
//! async fn main() -> spotgrab::Res<()> {
//!     config::load_env().await?;
//!     let ctx = config::AppContext::new(config::Config::from_env()?)?;
//!     let authenticator = spotify::SpotifyAuthenticator::new(&ctx);
//!     let session = management::SessionManager::new(&ctx.config, &authenticator)
//!         .establish(&management::LoginHint::default())
//!         .await?;
//!     let tokens = Arc::new(spotify::TokenProvider::new(Arc::new(session)));
//!     let client = spotify::ApiClient::new(&ctx, tokens);
//!     // Use catalog queries...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Uses the crate-wide [`error::Error`], which wraps authentication, API,
/// download, configuration, storage and transport failures.
pub type Res<T> = std::result::Result<T, error::Error>;

/// Prints an informational message with a blue bullet point.
///
/// Used for user-facing output that must be seen regardless of the log
/// level, such as the login URL.
///
/// # Example
///
/// ```
/// info!("Click on the following link to login:\n{}", url);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Logged in as {}", username);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1 right after printing. Only the binary uses
/// this; library code returns errors instead.
///
/// # Example
///
/// ```
/// fatal!("Login failed: {}", err);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! fatal {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues the user should notice.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser. Please navigate to the URL above manually.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
