//! Configuration management for spotgrab.
//!
//! This module loads the runtime settings the request pipeline reads: catalog
//! language and locale, retry bounds, credential persistence, and the OAuth
//! endpoints. Settings are resolved once at startup into a [`Config`] value
//! that is then passed by reference to everything that needs it; nothing reads
//! the environment after that point.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

use crate::error::ConfigError;

const APP_DIR: &str = "spotgrab";

/// Public client id of the desktop keymaster application.
pub const DEFAULT_CLIENT_ID: &str = "65b708073fc0480ea92a077233ca87bd";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Port the interactive login callback listener binds to.
pub const OAUTH_PORT: u16 = 4381;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under the platform-specific local data directory:
/// - Linux: `~/.local/share/spotgrab/.env`
/// - macOS: `~/Library/Application Support/spotgrab/.env`
/// - Windows: `%LOCALAPPDATA%/spotgrab/.env`
///
/// A missing file is not an error; every setting has a default. A file that
/// exists but cannot be parsed is reported.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if async_fs::metadata(&path).await.is_err() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        reason: e.to_string(),
    })
}

/// Returns the application's local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Process-wide settings, fixed after startup.
#[derive(Debug, Clone)]
pub struct Config {
    language: String,
    locale: String,
    retry_attempts: u32,
    save_credentials: bool,
    credentials_location: PathBuf,
    oauth_address: String,
    oauth_timeout: Duration,
    client_id: String,
    api_url: String,
    auth_url: String,
    token_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            locale: "en".to_string(),
            retry_attempts: 1,
            save_credentials: true,
            credentials_location: data_dir().join("credentials.json"),
            oauth_address: "127.0.0.1".to_string(),
            oauth_timeout: Duration::from_secs(300),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// Call [`load_env`] first so values from the `.env` file are visible.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Keys are the `SPOTGRAB_*` variable names. Unset or empty keys fall back
    /// to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean setting
    /// cannot be parsed, or when `SPOTGRAB_RETRY_ATTEMPTS` is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("SPOTGRAB_LANGUAGE") {
            config.language = v;
        }
        if let Some(v) = get("SPOTGRAB_LOCALE") {
            config.locale = v;
        }
        if let Some(v) = get("SPOTGRAB_RETRY_ATTEMPTS") {
            config.retry_attempts = match v.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SPOTGRAB_RETRY_ATTEMPTS",
                        expected: "a positive integer",
                        value: v,
                    });
                }
            };
        }
        if let Some(v) = get("SPOTGRAB_SAVE_CREDENTIALS") {
            config.save_credentials = parse_bool("SPOTGRAB_SAVE_CREDENTIALS", v)?;
        }
        if let Some(v) = get("SPOTGRAB_CREDENTIALS_LOCATION") {
            config.credentials_location = PathBuf::from(v);
        }
        if let Some(v) = get("SPOTGRAB_OAUTH_ADDRESS") {
            config.oauth_address = v;
        }
        if let Some(v) = get("SPOTGRAB_OAUTH_TIMEOUT") {
            let secs = v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "SPOTGRAB_OAUTH_TIMEOUT",
                    expected: "a number of seconds",
                    value: v.clone(),
                })?;
            config.oauth_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("SPOTGRAB_CLIENT_ID") {
            config.client_id = v;
        }
        if let Some(v) = get("SPOTGRAB_API_URL") {
            config.api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("SPOTGRAB_AUTH_URL") {
            config.auth_url = v;
        }
        if let Some(v) = get("SPOTGRAB_TOKEN_URL") {
            config.token_url = v;
        }

        Ok(config)
    }

    /// Language sent as `Accept-Language` on every catalog request.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Locale used when asking for localized album and track names.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Total number of attempts per request, always at least 1.
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn save_credentials(&self) -> bool {
        self.save_credentials
    }

    pub fn credentials_location(&self) -> &PathBuf {
        &self.credentials_location
    }

    pub fn oauth_address(&self) -> &str {
        &self.oauth_address
    }

    pub fn oauth_timeout(&self) -> Duration {
        self.oauth_timeout
    }

    /// Redirect URI registered for the interactive login callback.
    pub fn redirect_uri(&self) -> String {
        format!(
            "http://{addr}:{port}/login",
            addr = self.oauth_address,
            port = OAUTH_PORT
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Base URL of the catalog Web API, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            expected: "a boolean",
            value,
        }),
    }
}

/// Everything constructed once at startup and shared by reference.
///
/// Clone is cheap - `reqwest::Client` uses `Arc` internally.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub http: reqwest::Client,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { config, http })
    }
}
