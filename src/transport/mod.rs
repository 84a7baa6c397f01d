//! The pluggable transport contract and the transport registry.
//!
//! A transport is a named backend capability for locating image data: a
//! remote registry, a local directory, and so on. Transports turn
//! transport-scoped strings into [`Reference`] values and validate trust
//! policy scope strings for their backend.
//!
//! The [`TransportRegistry`] is constructed once at process startup, has the
//! built-in transports registered into it, and is then shared read-only by
//! every call site that needs to resolve a transport-qualified image name.

use crate::dir::DirReference;
use crate::docker::DockerReference;
use crate::error::{ImageError, Result};
use crate::reference::NamedReference;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};


/// A named backend capability for locating and storing image data.
///
/// Implementations must use a stable lowercase name; it doubles as the
/// string prefix separating the transport from the backend-specific part of
/// a user-typed image name (`docker://...`, `dir:/some/path`).
pub trait Transport: Send + Sync {
    /// The unique lowercase name of this transport.
    fn name(&self) -> &'static str;

    /// Parses a transport-scoped string (without the `name:` prefix) into a
    /// reference.
    fn parse_reference(&self, reference: &str) -> Result<Reference>;

    /// Checks that `scope` is a valid policy scope for this transport, i.e.
    /// a plausible `policy_identity()` or `policy_namespaces()` value. The
    /// empty string (the universal default scope) is never passed here.
    fn validate_scope(&self, scope: &str) -> Result<()>;
}

/// An immutable, transport-bound identifier for one image.
///
/// The variant set is closed: each backend contributes one variant, and all
/// capability methods dispatch over it. New backends are added by
/// implementing [`Transport`] and extending this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A reference into a remote registry.
    Docker(DockerReference),
    /// A reference to a local directory using the libimage on-disk layout.
    Directory(DirReference),
}

impl Reference {
    /// The name of the transport this reference belongs to.
    pub fn transport_name(&self) -> &'static str {
        match self {
            Reference::Docker(_) => crate::docker::TRANSPORT_NAME,
            Reference::Directory(_) => crate::dir::TRANSPORT_NAME,
        }
    }

    /// Renders the transport-scoped string form of this reference.
    ///
    /// Re-parsing the result through the same transport yields a reference
    /// whose `string_within_transport()` is byte-identical; the original
    /// user input is not necessarily recovered. The transport name prefix is
    /// not included.
    pub fn string_within_transport(&self) -> String {
        match self {
            Reference::Docker(r) => r.string_within_transport(),
            Reference::Directory(r) => r.string_within_transport(),
        }
    }

    /// Returns the canonical cross-transport registry identity of this
    /// reference, if the backend has one.
    pub fn docker_reference(&self) -> Option<&NamedReference> {
        match self {
            Reference::Docker(r) => Some(r.name()),
            Reference::Directory(_) => None,
        }
    }

    /// The canonical identity string used for trust policy lookup.
    pub fn policy_identity(&self) -> String {
        match self {
            Reference::Docker(r) => r.policy_identity(),
            Reference::Directory(r) => r.policy_identity(),
        }
    }

    /// Progressively broader policy scopes to search when no rule matches
    /// [`Reference::policy_identity`], most specific first. The implicit
    /// universal default scope `""` is not included.
    pub fn policy_namespaces(&self) -> Vec<String> {
        match self {
            Reference::Docker(r) => r.policy_namespaces(),
            Reference::Directory(r) => r.policy_namespaces(),
        }
    }
}

/// Process-wide table mapping transport names to implementations.
///
/// Registration happens during startup and is guarded by a lock; lookups
/// after that point are concurrent reads.
pub struct TransportRegistry {
    transports: RwLock<HashMap<&'static str, Arc<dyn Transport>>>,
}

impl TransportRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            transports: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry with the built-in transports registered.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::transport::TransportRegistry;
    ///
    /// let registry = TransportRegistry::with_defaults();
    /// assert!(registry.get("docker").is_some());
    /// assert!(registry.get("dir").is_some());
    /// ```
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry
            .register(Arc::new(crate::docker::DockerTransport))
            .expect("built-in transport names are unique");
        registry
            .register(Arc::new(crate::dir::DirTransport))
            .expect("built-in transport names are unique");
        registry
    }

    /// Registers a transport. Fails with `DuplicateTransport` if a transport
    /// with the same name is already present.
    pub fn register(&self, transport: Arc<dyn Transport>) -> Result<()> {
        let name = transport.name();
        let mut table = self
            .transports
            .write()
            .expect("transport registry lock poisoned");
        if table.contains_key(name) {
            return Err(ImageError::duplicate_transport(name));
        }
        table.insert(name, transport);
        Ok(())
    }

    /// Looks up a transport by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Transport>> {
        self.transports
            .read()
            .expect("transport registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Parses a fully qualified image name of the form
    /// `<transport>:<transport-specific-string>`.
    ///
    /// A bare name with no transport qualifier is rejected here even when a
    /// transport's own parse function would accept the unqualified form.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::transport::TransportRegistry;
    ///
    /// let registry = TransportRegistry::with_defaults();
    /// let reference = registry.parse_image_name("docker://busybox").unwrap();
    /// assert_eq!(reference.transport_name(), "docker");
    /// ```
    pub fn parse_image_name(&self, raw: &str) -> Result<Reference> {
        let (name, rest) = raw
            .split_once(':')
            .ok_or_else(|| ImageError::unknown_transport(raw))?;
        let transport = self
            .get(name)
            .ok_or_else(|| ImageError::unknown_transport(name))?;
        transport.parse_reference(rest)
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
