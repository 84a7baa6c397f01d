use super::*;
use std::error::Error;

#[test]
fn test_invalid_input_error_display() {
    let err = ImageError::invalid_input("repository name must be lowercase");

    assert!(matches!(err, ImageError::InvalidInput { .. }));
    assert!(err.to_string().contains("lowercase"));
}

#[test]
fn test_invalid_input_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
    let err = ImageError::invalid_input_with_source("could not parse reference", io_err);

    assert!(err.source().is_some());
}

#[test]
fn test_unsupported_combination_error() {
    let err = ImageError::unsupported_combination("reference has neither a tag nor a digest");

    assert!(matches!(err, ImageError::UnsupportedCombination { .. }));
    assert!(err.to_string().contains("neither a tag nor a digest"));
}

#[test]
fn test_unknown_transport_error() {
    let err = ImageError::unknown_transport("bogus");

    assert!(matches!(err, ImageError::UnknownTransport { .. }));
    assert!(err.to_string().contains("bogus"));
}

#[test]
fn test_duplicate_transport_error() {
    let err = ImageError::duplicate_transport("docker");

    assert!(err.to_string().contains("docker"));
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn test_invalid_scope_error() {
    let err = ImageError::invalid_scope("relative/path", "must be an absolute path");

    assert!(matches!(err, ImageError::InvalidScope { .. }));
    assert!(err.to_string().contains("relative/path"));
    assert!(err.to_string().contains("absolute"));
}

#[test]
fn test_no_suitable_endpoint_error() {
    let err = ImageError::no_suitable_endpoint("docker.io/library/busybox");

    assert!(matches!(err, ImageError::NoSuitableEndpoint { .. }));
    assert!(err.to_string().contains("busybox"));
}

#[test]
fn test_protocol_not_supported_error() {
    let err = ImageError::protocol_not_supported(
        "https://registry.example.com",
        "v2 API not available",
    );

    assert!(matches!(err, ImageError::ProtocolNotSupported { .. }));
    assert!(err.to_string().contains("registry.example.com"));
}

#[test]
fn test_fetch_failed_error_carries_context() {
    let err = ImageError::fetch_failed(
        "docker.io/library/busybox",
        "https://registry-1.docker.io",
        "manifest unknown",
    );

    let rendered = err.to_string();
    assert!(rendered.contains("docker.io/library/busybox"));
    assert!(rendered.contains("registry-1.docker.io"));
    assert!(rendered.contains("manifest unknown"));
}

#[test]
fn test_fetch_failed_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    let err = ImageError::fetch_failed_with_source(
        "example.com/ns/repo",
        "https://example.com",
        "connection reset",
        io_err,
    );

    assert!(err.source().is_some());
}

#[test]
fn test_canceled_error() {
    let err = ImageError::canceled("deadline exceeded");

    assert!(matches!(err, ImageError::Canceled { .. }));
    assert!(err.to_string().contains("deadline exceeded"));
}

#[test]
fn test_network_error() {
    let err = ImageError::network("connection refused");

    assert!(matches!(err, ImageError::Network { .. }));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn test_authentication_error() {
    let err = ImageError::authentication("invalid credentials", Some(401));

    assert!(matches!(
        err,
        ImageError::Authentication {
            status_code: Some(401),
            ..
        }
    ));
}

#[test]
fn test_server_error() {
    let err = ImageError::server("internal server error", 500);

    assert!(err.to_string().contains("500"));
}

#[test]
fn test_io_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = ImageError::io_with_source("failed to resolve path", io_err);

    assert!(matches!(err, ImageError::Io { .. }));
    assert!(err.source().is_some());
}

#[test]
fn test_errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ImageError>();
}
