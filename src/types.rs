use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Authentication mechanism recorded in a credential blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationType {
    #[serde(rename = "AUTHENTICATION_STORED_SPOTIFY_CREDENTIALS")]
    StoredSpotifyCredentials,
}

/// Response body of the accounts token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// State shared between the login flow and the callback handler.
#[derive(Debug, Clone)]
pub struct PkceState {
    pub code_verifier: String,
    pub state: String,
    pub redirect_uri: String,
    pub token: Option<TokenResponse>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub album: Option<Album>,
}

/// One fragment of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Item of a list response where only the identifier matters.
#[derive(Debug, Clone, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

/// Extra template placeholder values handed to the track collaborator.
pub type ExtraKeys = BTreeMap<String, String>;

#[derive(Tabled, Debug, Clone)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub album_num: String,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub id: String,
}
