//! HTTP client for the v2 registry protocol.
//!
//! This module provides a thin HTTP client built on reqwest for talking to
//! registries speaking the v2 / OCI distribution API. It knows how to probe
//! the protocol version and fetch raw manifests; classification of failures
//! for endpoint fallback happens one layer up, in the fetch module.

use crate::auth::Credentials;
use crate::error::{ImageError, Result};
use crate::image::ManifestPayload;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use std::time::Duration;

#[cfg(test)]
mod tests;

const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json";

/// Version information returned by the registry's `/v2/` probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryVersion {
    /// The Docker-Distribution-API-Version header value, if present.
    /// Typically "registry/2.0".
    pub api_version: Option<String>,
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client bound to one registry endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: ReqwestClient,
    registry_url: String,
    credentials: Option<Credentials>,
}

impl Client {
    /// Creates a new client for the specified endpoint URL with default
    /// configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::client::Client;
    ///
    /// let client = Client::new("http://localhost:5000", None).unwrap();
    /// assert_eq!(client.registry_url(), "http://localhost:5000");
    /// ```
    pub fn new(registry_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_config(registry_url, credentials, ClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(
        registry_url: &str,
        credentials: Option<Credentials>,
        config: ClientConfig,
    ) -> Result<Self> {
        let normalized_url = Self::normalize_url(registry_url)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| ImageError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            credentials,
        })
    }

    /// Normalizes an endpoint URL by ensuring it has a scheme and removing
    /// trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ImageError::invalid_input("Endpoint URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base endpoint URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Probes the `/v2/` endpoint to check that the registry speaks the v2
    /// protocol.
    ///
    /// A 404 means the endpoint is reachable but does not serve the v2 API;
    /// that is reported as `ProtocolNotSupported` so the fallback loop can
    /// rank it below concrete failures.
    pub async fn check_version(&self) -> Result<RegistryVersion> {
        let url = format!("{}/v2/", self.registry_url);

        let mut request = self.http_client.get(&url);
        if let Some(creds) = &self.credentials
            && let Some(auth_header) = creds.to_header_value()
        {
            request = request.header("Authorization", auth_header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, &self.registry_url))?;

        // Extract version information from headers before consuming response
        let api_version = response
            .headers()
            .get("Docker-Distribution-API-Version")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ImageError::protocol_not_supported(
                self.registry_url.clone(),
                "endpoint does not serve the v2 API".to_string(),
            ));
        }

        Self::check_response_status(response).await?;

        Ok(RegistryVersion { api_version })
    }

    /// Fetches a manifest from `/v2/<name>/manifests/<reference>`.
    ///
    /// The reference can be either a tag name or a digest. Returns the raw
    /// manifest bytes together with the Docker-Content-Digest header and
    /// the response media type; no parsing is attempted here.
    pub async fn fetch_manifest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<ManifestPayload> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.registry_url, repository, reference
        );

        let mut request = self.http_client.get(&url).header("Accept", MANIFEST_ACCEPT);
        if let Some(creds) = &self.credentials
            && let Some(auth_header) = creds.to_header_value()
        {
            request = request.header("Authorization", auth_header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, &self.registry_url))?;

        // Extract headers before consuming response
        let digest = response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response = Self::check_response_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::network_with_source("Failed to read manifest response", e))?;

        Ok(ManifestPayload {
            bytes: bytes.to_vec(),
            digest,
            media_type,
        })
    }

    /// Translates a reqwest error into an ImageError. Timeouts surface as
    /// cancellation so the fallback loop stops instead of trying further
    /// endpoints.
    fn translate_reqwest_error(error: reqwest::Error, registry_url: &str) -> ImageError {
        if error.is_timeout() {
            ImageError::canceled(format!("request to {} timed out", registry_url))
        } else if error.is_connect() {
            ImageError::network_with_source(
                format!("Failed to connect to registry at {}", registry_url),
                error,
            )
        } else if error.is_request() {
            ImageError::network_with_source(
                format!("Failed to send request to {}", registry_url),
                error,
            )
        } else {
            ImageError::network_with_source(
                format!("Network error communicating with {}", registry_url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates errors to ImageError.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(ImageError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(ImageError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(ImageError::not_found("resource", &url)),
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err(ImageError::server(
                format!("Server error from {}: {}", url, error_body),
                status.as_u16(),
            )),
            _ => Err(ImageError::network(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                error_body
            ))),
        }
    }
}
