//! Registry endpoint discovery.
//!
//! Given a registry host, discovery produces an ordered list of candidate
//! endpoints for the fallback fetcher: newest protocol first, TLS before
//! plain HTTP, with HTTP offered only for registries explicitly configured
//! as insecure.

use crate::config::Config;
use crate::reference::DEFAULT_REGISTRY;
use std::fmt;


/// Canonical network endpoint of the default public registry.
pub const DEFAULT_REGISTRY_ENDPOINT: &str = "https://registry-1.docker.io";

/// Registry API protocol versions, ordered from oldest to newest.
///
/// The derived ordering is used by the fallback fetcher to skip endpoints
/// whose version is strictly lower than one already confirmed to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiVersion {
    /// The legacy v1 registry protocol.
    V1,
    /// The v2 / OCI distribution protocol.
    V2,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => f.write_str("v1"),
            ApiVersion::V2 => f.write_str("v2"),
        }
    }
}

/// One candidate network location offering registry service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL of the endpoint, including the scheme.
    pub url: String,
    /// Protocol version the endpoint is expected to speak.
    pub version: ApiVersion,
    /// Whether the endpoint is reached over TLS.
    pub tls: bool,
}

/// Produces the candidate pull endpoints for a registry host, in preference
/// order.
///
/// The default public registry always resolves to its canonical endpoint
/// and never gets an insecure fallback. Other hosts get v2 then v1 over
/// TLS, and additionally v2 then v1 over plain HTTP when the host is
/// configured insecure.
///
/// # Examples
///
/// ```
/// use libimage::config::Config;
/// use libimage::endpoint::{lookup_pull_endpoints, ApiVersion};
///
/// let endpoints = lookup_pull_endpoints("example.com:5000", &Config::default());
/// assert_eq!(endpoints[0].version, ApiVersion::V2);
/// assert_eq!(endpoints[0].url, "https://example.com:5000");
/// ```
pub fn lookup_pull_endpoints(domain: &str, config: &Config) -> Vec<Endpoint> {
    if domain == DEFAULT_REGISTRY {
        return vec![Endpoint {
            url: DEFAULT_REGISTRY_ENDPOINT.to_string(),
            version: ApiVersion::V2,
            tls: true,
        }];
    }

    let mut endpoints = vec![
        Endpoint {
            url: format!("https://{}", domain),
            version: ApiVersion::V2,
            tls: true,
        },
        Endpoint {
            url: format!("https://{}", domain),
            version: ApiVersion::V1,
            tls: true,
        },
    ];

    if config.is_insecure_registry(domain) {
        endpoints.push(Endpoint {
            url: format!("http://{}", domain),
            version: ApiVersion::V2,
            tls: false,
        });
        endpoints.push(Endpoint {
            url: format!("http://{}", domain),
            version: ApiVersion::V1,
            tls: false,
        });
    }

    endpoints
}
