use serde_json::json;
use spotgrab::types::ArtistRef;
use spotgrab::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Deterministic for the same input
    assert_eq!(challenge, generate_code_challenge(verifier));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // URL-safe base64 without padding
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_generate_code_challenge_known_value() {
    // RFC 7636 appendix B
    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    assert_eq!(
        generate_code_challenge(verifier),
        "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    );
}

#[test]
fn test_generate_state() {
    let state = generate_state();
    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(state, generate_state());
}

#[test]
fn test_album_num_padding() {
    assert_eq!(album_num(1), "01");
    assert_eq!(album_num(9), "09");
    assert_eq!(album_num(10), "10");
    assert_eq!(album_num(123), "123");
}

#[test]
fn test_join_artist_names() {
    let artists = vec![
        ArtistRef {
            id: "a1".to_string(),
            name: "First".to_string(),
        },
        ArtistRef {
            id: "a2".to_string(),
            name: "Second".to_string(),
        },
    ];
    assert_eq!(join_artist_names(&artists), "First, Second");
    assert_eq!(join_artist_names(&[]), "");
}

#[test]
fn test_is_empty_json() {
    assert!(is_empty_json(&json!(null)));
    assert!(is_empty_json(&json!(false)));
    assert!(is_empty_json(&json!(0)));
    assert!(is_empty_json(&json!("")));
    assert!(is_empty_json(&json!([])));
    assert!(is_empty_json(&json!({})));

    assert!(!is_empty_json(&json!(true)));
    assert!(!is_empty_json(&json!(1)));
    assert!(!is_empty_json(&json!("x")));
    assert!(!is_empty_json(&json!([0])));
    assert!(!is_empty_json(&json!({"items": []})));
}

#[test]
fn test_extract_id_forms() {
    let id = "4aawyAB9vmqN3uQ7FjRGTy";

    assert_eq!(extract_id(id, "album"), id);
    assert_eq!(extract_id(&format!("  {id}  "), "album"), id);
    assert_eq!(extract_id(&format!("spotify:album:{id}"), "album"), id);
    assert_eq!(
        extract_id(&format!("https://open.spotify.com/album/{id}"), "album"),
        id
    );
    assert_eq!(
        extract_id(
            &format!("https://open.spotify.com/album/{id}?si=abcdef"),
            "album"
        ),
        id
    );
    assert_eq!(
        extract_id(
            &format!("https://open.spotify.com/intl-de/artist/{id}/"),
            "artist"
        ),
        id
    );
}

#[test]
fn test_extract_id_wrong_kind_is_unchanged() {
    let input = "spotify:track:abc";
    assert_eq!(extract_id(input, "album"), input);
}
