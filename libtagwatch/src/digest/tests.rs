use super::*;
use std::str::FromStr;

const VALID: &str = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";

#[test]
fn test_digest_from_valid_string_succeeds() {
    assert!(Digest::from_str(VALID).is_ok());
}

#[test]
fn test_digest_from_invalid_string_is_transport_error() {
    let digest = Digest::from_str("sha256:invalid-digest");
    assert!(matches!(digest.unwrap_err(), TagWatchError::Transport { .. }));
}

#[test]
fn test_digest_display_round_trips_header_value() {
    let digest = Digest::from_str(VALID).unwrap();
    assert_eq!(digest.to_string(), VALID);
}

#[test]
fn test_digest_parts() {
    let digest = Digest::from_str(VALID).unwrap();
    assert_eq!(digest.algorithm(), "sha256");
    assert_eq!(
        digest.hex(),
        "7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc"
    );
}
