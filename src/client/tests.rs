use super::*;

#[test]
fn test_client_new_with_valid_url() {
    let client = Client::new("http://localhost:5000", None);
    assert!(client.is_ok());
}

#[test]
fn test_client_new_with_https_url() {
    let client = Client::new("https://registry.example.com", None);
    assert!(client.is_ok());
}

#[test]
fn test_client_defaults_to_https_without_scheme() {
    let client = Client::new("registry.example.com", None).unwrap();
    assert_eq!(client.registry_url(), "https://registry.example.com");
}

#[test]
fn test_client_removes_trailing_slashes() {
    let client = Client::new("http://localhost:5000///", None).unwrap();
    assert_eq!(client.registry_url(), "http://localhost:5000");
}

#[test]
fn test_client_new_with_empty_url_fails() {
    let client = Client::new("", None);
    assert!(client.is_err());
    assert!(matches!(
        client.unwrap_err(),
        ImageError::InvalidInput { .. }
    ));
}

#[test]
fn test_client_new_with_whitespace_url_fails() {
    assert!(Client::new("   ", None).is_err());
}

#[test]
fn test_client_with_credentials() {
    let creds = Credentials::basic("user", "pass");
    let client = Client::new("http://localhost:5000", Some(creds));
    assert!(client.is_ok());
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::new()
        .with_timeout(60)
        .with_max_idle_per_host(20);
    assert_eq!(config.timeout_seconds, 60);
    assert_eq!(config.max_idle_per_host, 20);
}

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.max_idle_per_host, 10);
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::new().with_timeout(5);
    let client = Client::with_config("http://localhost:5000", None, config);
    assert!(client.is_ok());
}
