use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

type FetchResult = std::result::Result<ManifestPayload, FetchFailure>;

enum Script {
    ConstructError(ImageError),
    Respond(FetchResult),
}

/// Factory that replays pre-scripted results per (url, version) pair and
/// records which endpoints were attempted, in order.
struct ScriptedFactory {
    scripts: Mutex<HashMap<(String, ApiVersion), Script>>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedFactory {
    fn new(scripts: Vec<(&str, ApiVersion, Script)>) -> Self {
        let scripts = scripts
            .into_iter()
            .map(|(url, version, script)| ((url.to_string(), version), script))
            .collect();
        Self {
            scripts: Mutex::new(scripts),
            attempts: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

struct ScriptedFetcher {
    result: Mutex<Option<FetchResult>>,
}

impl ManifestFetcher for ScriptedFetcher {
    async fn fetch(&self, _name: &NamedReference) -> FetchResult {
        self.result
            .lock()
            .unwrap()
            .take()
            .expect("endpoint fetched more than once")
    }
}

impl FetcherFactory for ScriptedFactory {
    type Fetcher = ScriptedFetcher;

    fn fetcher_for(&self, endpoint: &Endpoint) -> Result<ScriptedFetcher> {
        self.attempts
            .lock()
            .unwrap()
            .push(format!("{} {}", endpoint.version, endpoint.url));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .remove(&(endpoint.url.clone(), endpoint.version))
            .expect("no script for attempted endpoint");
        match script {
            Script::ConstructError(error) => Err(error),
            Script::Respond(result) => Ok(ScriptedFetcher {
                result: Mutex::new(Some(result)),
            }),
        }
    }
}

fn endpoint(url: &str, version: ApiVersion) -> Endpoint {
    Endpoint {
        url: url.to_string(),
        version,
        tls: url.starts_with("https://"),
    }
}

fn name() -> NamedReference {
    NamedReference::parse_normalized("busybox").unwrap()
}

fn payload() -> ManifestPayload {
    ManifestPayload {
        bytes: br#"{"schemaVersion": 2}"#.to_vec(),
        digest: None,
        media_type: Some("application/vnd.oci.image.manifest.v1+json".to_string()),
    }
}

fn success() -> Script {
    Script::Respond(Ok(payload()))
}

fn version_mismatch(url: &str) -> Script {
    Script::Respond(Err(FetchFailure::fallback(
        ImageError::protocol_not_supported(url.to_string(), "no v2 api here".to_string()),
        false,
    )))
}

fn connection_refused(confirmed: bool) -> Script {
    Script::Respond(Err(FetchFailure::fallback(
        ImageError::network("connection refused"),
        confirmed,
    )))
}

#[test]
fn test_fallback_failure_kind_derived_from_error() {
    let failure = FetchFailure::fallback(
        ImageError::protocol_not_supported("https://a", "no v2"),
        false,
    );
    assert_eq!(failure.kind, FailureKind::ProtocolNotSupported);
    assert!(failure.fallback);

    let failure = FetchFailure::fallback(ImageError::network("connection refused"), true);
    assert_eq!(failure.kind, FailureKind::Other);
    assert!(failure.confirmed_protocol);

    let failure = FetchFailure::terminal(ImageError::authentication("denied", Some(401)));
    assert!(!failure.fallback);
}

#[tokio::test]
async fn test_first_success_wins() {
    let factory = ScriptedFactory::new(vec![
        ("https://a.example.com", ApiVersion::V2, success()),
        ("https://b.example.com", ApiVersion::V2, success()),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    let payload = fetch_manifest(&factory, &name(), &endpoints).await.unwrap();
    assert!(!payload.bytes.is_empty());
    assert_eq!(factory.attempts(), vec!["v2 https://a.example.com"]);
}

#[tokio::test]
async fn test_success_after_fallback() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            connection_refused(false),
        ),
        ("https://b.example.com", ApiVersion::V2, success()),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    assert!(fetch_manifest(&factory, &name(), &endpoints).await.is_ok());
    assert_eq!(
        factory.attempts(),
        vec!["v2 https://a.example.com", "v2 https://b.example.com"]
    );
}

#[tokio::test]
async fn test_confirmed_version_skips_older_endpoints() {
    // b confirms v2 works but fails for another reason, so the v1 endpoint
    // must never be attempted and b's concrete error must surface.
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            version_mismatch("https://a.example.com"),
        ),
        (
            "https://b.example.com",
            ApiVersion::V2,
            connection_refused(true),
        ),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
        endpoint("https://c.example.com", ApiVersion::V1),
    ];

    let err = fetch_manifest(&factory, &name(), &endpoints)
        .await
        .unwrap_err();
    match err {
        ImageError::FetchFailed {
            repository,
            endpoint,
            message,
            ..
        } => {
            assert_eq!(repository, "docker.io/library/busybox");
            assert_eq!(endpoint, "https://b.example.com");
            assert!(message.contains("connection refused"));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert_eq!(
        factory.attempts(),
        vec!["v2 https://a.example.com", "v2 https://b.example.com"]
    );
}

#[tokio::test]
async fn test_concrete_error_not_masked_by_later_version_mismatch() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            connection_refused(false),
        ),
        (
            "https://b.example.com",
            ApiVersion::V2,
            version_mismatch("https://b.example.com"),
        ),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    let err = fetch_manifest(&factory, &name(), &endpoints)
        .await
        .unwrap_err();
    match err {
        ImageError::FetchFailed { message, .. } => {
            assert!(message.contains("connection refused"));
            assert!(!message.contains("Protocol not supported"));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_version_mismatch_surfaces_when_nothing_better() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            version_mismatch("https://a.example.com"),
        ),
        (
            "https://b.example.com",
            ApiVersion::V2,
            version_mismatch("https://b.example.com"),
        ),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    let err = fetch_manifest(&factory, &name(), &endpoints)
        .await
        .unwrap_err();
    match err {
        ImageError::FetchFailed { message, .. } => {
            assert!(message.contains("Protocol not supported"));
            assert!(message.contains("b.example.com"));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_stops_fallback() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            Script::Respond(Err(FetchFailure::canceled(ImageError::canceled(
                "request to https://a.example.com timed out",
            )))),
        ),
        ("https://b.example.com", ApiVersion::V2, success()),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    let err = fetch_manifest(&factory, &name(), &endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Canceled { .. }));
    assert_eq!(factory.attempts(), vec!["v2 https://a.example.com"]);
}

#[tokio::test]
async fn test_terminal_failure_stops_fallback() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V2,
            Script::Respond(Err(FetchFailure::terminal(ImageError::authentication(
                "bad credentials",
                Some(401),
            )))),
        ),
        ("https://b.example.com", ApiVersion::V2, success()),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V2),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    let err = fetch_manifest(&factory, &name(), &endpoints)
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Authentication { .. }));
    assert_eq!(factory.attempts(), vec!["v2 https://a.example.com"]);
}

#[tokio::test]
async fn test_empty_endpoint_list() {
    let factory = ScriptedFactory::new(vec![]);

    let err = fetch_manifest(&factory, &name(), &[]).await.unwrap_err();
    match err {
        ImageError::NoSuitableEndpoint { repository } => {
            assert_eq!(repository, "docker.io/library/busybox");
        }
        other => panic!("expected NoSuitableEndpoint, got {other:?}"),
    }
}

#[tokio::test]
async fn test_construction_failure_continues_to_next_endpoint() {
    let factory = ScriptedFactory::new(vec![
        (
            "https://a.example.com",
            ApiVersion::V1,
            Script::ConstructError(ImageError::protocol_not_supported(
                "https://a.example.com",
                "no fetcher available for protocol version v1",
            )),
        ),
        ("https://b.example.com", ApiVersion::V2, success()),
    ]);
    let endpoints = vec![
        endpoint("https://a.example.com", ApiVersion::V1),
        endpoint("https://b.example.com", ApiVersion::V2),
    ];

    assert!(fetch_manifest(&factory, &name(), &endpoints).await.is_ok());
    assert_eq!(
        factory.attempts(),
        vec!["v1 https://a.example.com", "v2 https://b.example.com"]
    );
}

#[test]
fn test_registry_factory_has_no_v1_fetcher() {
    let config = Config::default();
    let factory = RegistryFetcherFactory::new(&config, None);

    let err = factory
        .fetcher_for(&endpoint("https://example.com", ApiVersion::V1))
        .unwrap_err();
    assert!(matches!(err, ImageError::ProtocolNotSupported { .. }));

    assert!(
        factory
            .fetcher_for(&endpoint("https://example.com", ApiVersion::V2))
            .is_ok()
    );
}
