//! Manifest fetching with endpoint fallback.
//!
//! Given an ordered list of candidate endpoints, the fetch loop attempts
//! manifest retrieval per endpoint, classifies failures, and decides whether
//! to retry on the next endpoint, skip a now-irrelevant protocol version, or
//! give up. The loop deliberately runs endpoints sequentially: a terminal
//! failure from an earlier, more-trusted endpoint must be allowed to
//! short-circuit and is never raced against a later endpoint's success.

use crate::auth::Credentials;
use crate::client::{Client, ClientConfig};
use crate::config::Config;
use crate::endpoint::{ApiVersion, Endpoint};
use crate::error::{ImageError, Result};
use crate::image::ManifestPayload;
use crate::reference::NamedReference;
use tracing::debug;

#[cfg(test)]
mod tests;

/// Discriminant for a classified fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The operation's deadline expired or it was canceled. Stops the loop;
    /// no further endpoints are tried.
    Canceled,
    /// The endpoint confirmed it does not speak the attempted protocol
    /// version. Low priority relative to concrete errors.
    ProtocolNotSupported,
    /// Any other failure.
    Other,
}

/// A classified failure from one endpoint attempt, inspected by value.
#[derive(Debug)]
pub struct FetchFailure {
    /// What kind of failure this is.
    pub kind: FailureKind,
    /// Whether the loop may continue with the next endpoint.
    pub fallback: bool,
    /// True when the endpoint's server definitely speaks the attempted
    /// protocol version, so the failure is unrelated to version mismatch.
    pub confirmed_protocol: bool,
    /// The underlying error.
    pub error: ImageError,
}

impl FetchFailure {
    /// A failure the loop may recover from by trying the next endpoint.
    /// The kind is derived from the wrapped error.
    pub fn fallback(error: ImageError, confirmed_protocol: bool) -> Self {
        let kind = match &error {
            ImageError::ProtocolNotSupported { .. } => FailureKind::ProtocolNotSupported,
            _ => FailureKind::Other,
        };
        FetchFailure {
            kind,
            fallback: true,
            confirmed_protocol,
            error,
        }
    }

    /// A failure that must stop the loop and surface immediately.
    pub fn terminal(error: ImageError) -> Self {
        FetchFailure {
            kind: FailureKind::Other,
            fallback: false,
            confirmed_protocol: false,
            error,
        }
    }

    /// A cancellation; surfaced verbatim, bypassing further fallback.
    pub fn canceled(error: ImageError) -> Self {
        FetchFailure {
            kind: FailureKind::Canceled,
            fallback: false,
            confirmed_protocol: false,
            error,
        }
    }
}

/// Fetches one repository's manifest from one endpoint using one protocol
/// version.
#[allow(async_fn_in_trait)]
pub trait ManifestFetcher {
    /// Attempts the fetch; failures are pre-classified for the fallback
    /// loop.
    async fn fetch(
        &self,
        name: &NamedReference,
    ) -> std::result::Result<ManifestPayload, FetchFailure>;
}

/// Builds per-version fetchers for endpoints. Construction fails for
/// protocol versions the factory has no fetcher for.
pub trait FetcherFactory {
    type Fetcher: ManifestFetcher;

    fn fetcher_for(&self, endpoint: &Endpoint) -> Result<Self::Fetcher>;
}

/// Attempts manifest retrieval across `endpoints` in order and returns the
/// first success or one aggregated terminal error.
///
/// The loop tracks three pieces of state local to this call:
/// - once any endpoint confirms a protocol version works, endpoints with a
///   strictly lower version are skipped without a network call;
/// - once a concrete (non-version-related) failure is seen, later
///   "protocol not supported" errors no longer overwrite it;
/// - cancellation stops the loop entirely and is surfaced verbatim.
pub async fn fetch_manifest<F: FetcherFactory>(
    factory: &F,
    name: &NamedReference,
    endpoints: &[Endpoint],
) -> Result<ManifestPayload> {
    let repository = name.name();
    let mut confirmed_version: Option<ApiVersion> = None;
    let mut discard_no_support = false;
    let mut last_error: Option<ImageError> = None;
    let mut last_endpoint = String::new();

    for endpoint in endpoints {
        if let Some(confirmed) = confirmed_version
            && endpoint.version < confirmed
        {
            debug!(
                url = %endpoint.url,
                version = %endpoint.version,
                "skipping endpoint, a newer protocol was already confirmed"
            );
            continue;
        }
        debug!(
            repository = %repository,
            url = %endpoint.url,
            version = %endpoint.version,
            "trying to fetch manifest"
        );

        let fetcher = match factory.fetcher_for(endpoint) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                last_error = Some(e);
                last_endpoint = endpoint.url.clone();
                continue;
            }
        };

        let failure = match fetcher.fetch(name).await {
            Ok(payload) => return Ok(payload),
            Err(failure) => failure,
        };
        last_endpoint = endpoint.url.clone();

        if failure.kind == FailureKind::Canceled {
            debug!(error = %failure.error, "fetch canceled, not trying further endpoints");
            return Err(failure.error);
        }
        if !failure.fallback {
            debug!(error = %failure.error, "not continuing after terminal failure");
            return Err(failure.error);
        }

        if failure.confirmed_protocol {
            confirmed_version = Some(match confirmed_version {
                Some(version) => version.max(endpoint.version),
                None => endpoint.version,
            });
        }

        match failure.kind {
            FailureKind::ProtocolNotSupported => {
                // Keep it only while nothing more informative has been seen.
                if !discard_no_support {
                    last_error = Some(failure.error);
                }
            }
            _ => {
                // A concrete failure is more actionable than a string of
                // wrong-protocol errors; do not let those mask it.
                discard_no_support = true;
                last_error = Some(failure.error);
            }
        }
    }

    match last_error {
        None => Err(ImageError::no_suitable_endpoint(repository)),
        Some(error) => {
            let message = error.to_string();
            Err(ImageError::fetch_failed_with_source(
                repository,
                last_endpoint,
                message,
                error,
            ))
        }
    }
}

/// The production factory: builds v2 fetchers over the HTTP client.
/// Construction fails for v1 endpoints, which the loop records and skips
/// past.
pub struct RegistryFetcherFactory<'a> {
    config: &'a Config,
    credentials: Option<Credentials>,
}

impl<'a> RegistryFetcherFactory<'a> {
    pub fn new(config: &'a Config, credentials: Option<Credentials>) -> Self {
        Self {
            config,
            credentials,
        }
    }
}

impl FetcherFactory for RegistryFetcherFactory<'_> {
    type Fetcher = V2ManifestFetcher;

    fn fetcher_for(&self, endpoint: &Endpoint) -> Result<V2ManifestFetcher> {
        match endpoint.version {
            ApiVersion::V2 => {
                let client_config =
                    ClientConfig::new().with_timeout(self.config.network.timeout);
                let client =
                    Client::with_config(&endpoint.url, self.credentials.clone(), client_config)?;
                Ok(V2ManifestFetcher { client })
            }
            version => Err(ImageError::protocol_not_supported(
                endpoint.url.clone(),
                format!("no fetcher available for protocol version {}", version),
            )),
        }
    }
}

/// Manifest fetcher speaking the v2 / OCI distribution protocol.
#[derive(Debug)]
pub struct V2ManifestFetcher {
    client: Client,
}

impl ManifestFetcher for V2ManifestFetcher {
    async fn fetch(
        &self,
        name: &NamedReference,
    ) -> std::result::Result<ManifestPayload, FetchFailure> {
        // Probe the protocol version first so that a version mismatch is
        // distinguishable from a failure of the actual request.
        if let Err(error) = self.client.check_version().await {
            return Err(classify_probe_error(error));
        }

        let reference = match name.digest() {
            Some(digest) => digest.to_string(),
            None => name
                .tag()
                .unwrap_or(crate::reference::DEFAULT_TAG)
                .to_string(),
        };
        match self.client.fetch_manifest(name.path(), &reference).await {
            Ok(payload) => Ok(payload),
            // The probe already succeeded, so whatever went wrong here is
            // not a protocol version mismatch.
            Err(error) => Err(classify_fetch_error(error)),
        }
    }
}

fn classify_probe_error(error: ImageError) -> FetchFailure {
    match &error {
        ImageError::Canceled { .. } => FetchFailure::canceled(error),
        // A 401/403 on the probe still proves the endpoint speaks v2.
        ImageError::Authentication { .. } => FetchFailure::fallback(error, true),
        _ => FetchFailure::fallback(error, false),
    }
}

fn classify_fetch_error(error: ImageError) -> FetchFailure {
    match &error {
        ImageError::Canceled { .. } => FetchFailure::canceled(error),
        _ => FetchFailure::fallback(error, true),
    }
}
