use super::*;
use std::error::Error;

#[test]
fn test_config_error_invalid_repository() {
    let err = TagWatchError::config("invalid repository name: Team/Svc");

    assert!(matches!(err, TagWatchError::Config { .. }));
    assert!(err.to_string().starts_with("Configuration error"));
    assert!(err.to_string().contains("Team/Svc"));
}

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err = TagWatchError::config_with_source("failed to read config", io_err);

    assert!(err.source().is_some());
    assert!(err.source().unwrap().to_string().contains("file not found"));
}

#[test]
fn test_auth_discovery_error_display() {
    let err = TagWatchError::auth_discovery("registry returned 401 without a challenge");

    assert!(matches!(err, TagWatchError::AuthDiscovery { .. }));
    assert!(err.to_string().contains("Authentication discovery error"));
    assert!(err.source().is_none());
}

#[test]
fn test_auth_discovery_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let err = TagWatchError::auth_discovery_with_source("probe failed", io_err);

    assert!(err.source().is_some());
}

#[test]
fn test_authentication_error_status_code() {
    let err = TagWatchError::authentication("token request rejected", Some(401));

    assert_eq!(err.status_code(), Some(401));
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("token request rejected"));
}

#[test]
fn test_transport_error_not_found() {
    let err = TagWatchError::transport("manifest unknown: svc:missing", Some(404));

    assert!(matches!(err, TagWatchError::Transport { .. }));
    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("svc:missing"));
}

#[test]
fn test_transport_error_with_source_has_no_status() {
    let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
    let err = TagWatchError::transport_with_source("request failed", io_err);

    assert_eq!(err.status_code(), None);
    assert!(err.source().is_some());
}

#[test]
fn test_config_error_has_no_status() {
    assert_eq!(TagWatchError::config("bad").status_code(), None);
    assert_eq!(TagWatchError::auth_discovery("bad").status_code(), None);
}

#[test]
fn test_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TagWatchError>();
}
