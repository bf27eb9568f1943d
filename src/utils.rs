use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::ArtistRef;

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the authorization server to tie the callback
/// to the request that started it.
pub fn generate_state() -> String {
    random_string(32)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Formats a 1-based position as used by the `album_num` placeholder.
///
/// Always at least two digits; wider numbers are kept as-is.
pub fn album_num(position: usize) -> String {
    format!("{:02}", position)
}

pub fn join_artist_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns `true` when a JSON value would be considered empty by the catalog
/// response classifier: null, false, zero, or an empty string/array/object.
pub fn is_empty_json(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Pulls the bare id out of a share link or URI of the given `kind`.
///
/// Accepts `https://open.spotify.com/<kind>/<id>?si=...`,
/// `spotify:<kind>:<id>`, or a bare id, which is returned unchanged.
pub fn extract_id(input: &str, kind: &str) -> String {
    let input = input.trim();

    let uri_prefix = format!("spotify:{kind}:");
    if let Some(id) = input.strip_prefix(&uri_prefix) {
        return id.to_string();
    }

    let segment = format!("/{kind}/");
    if let Some(pos) = input.find(&segment) {
        let rest = &input[pos + segment.len()..];
        let end = rest.find(['?', '/', '#']).unwrap_or(rest.len());
        return rest[..end].to_string();
    }

    input.to_string()
}
