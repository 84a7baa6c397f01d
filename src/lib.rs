//! libimage - Container Image Reference and Transport Library
//!
//! libimage provides parsing and normalization of container image
//! references, a pluggable transport layer for locating images in
//! registries or local directories, trust-policy scope derivation, and
//! manifest fetching with registry endpoint fallback.
//!
//! # Quick Start
//!
//! ```
//! use libimage::transport::TransportRegistry;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = TransportRegistry::with_defaults();
//!
//!     // Parse a transport-qualified image name
//!     let reference = registry.parse_image_name("docker://busybox")?;
//!     assert_eq!(reference.transport_name(), "docker");
//!     assert_eq!(
//!         reference.string_within_transport(),
//!         "//busybox:latest"
//!     );
//!
//!     // Derive the identity used for trust-policy lookup
//!     assert_eq!(
//!         reference.policy_identity(),
//!         "docker.io/library/busybox:latest"
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`TransportRegistry`] - Transport lookup and central image-name parsing
//! - [`Reference`] - A parsed, transport-qualified image reference
//! - [`NamedReference`] - A normalized registry repository name
//! - [`Credentials`] - Authentication credentials
//! - [`Digest`] - Content digest validation and handling
//! - [`ImageError`] - Error type covering parsing, scopes, and fetching
//!
//! # Architecture
//!
//! Each transport lives in its own module ([`docker`] for registries,
//! [`dir`] for local directory layouts) and plugs into the shared
//! [`transport`] abstraction. Manifest retrieval is layered: the [`client`]
//! module speaks the v2 HTTP protocol to a single endpoint, [`endpoint`]
//! discovers candidate endpoints for a registry host, and [`fetch`] runs
//! the fallback loop across them.

#![warn(clippy::all)]

/// Returns the libimage crate version.
///
/// This is useful for version reporting in CLI tools and debugging.
///
/// # Examples
///
/// ```
/// let version = libimage::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use auth::Credentials;
pub use config::Config;
pub use digest::Digest;
pub use error::{ImageError, Result};
pub use reference::NamedReference;
pub use transport::{Reference, Transport, TransportRegistry};

pub mod auth;
pub mod client;
pub mod config;
pub mod digest;
pub mod dir;
pub mod docker;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod image;
pub mod reference;
pub mod transport;
