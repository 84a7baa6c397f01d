//! The registry-backed transport.
//!
//! References under this transport identify one image inside a remote
//! registry. The transport-scoped string form is `//name[:tag|@digest]`;
//! parsing normalizes the name (default registry, namespace, and tag) so
//! that a reference is always pinned to exactly one tag or digest.

use crate::error::{ImageError, Result};
use crate::reference::{self, NamedReference};
use crate::transport::{Reference, Transport};


/// The lookup name of the registry-backed transport.
pub const TRANSPORT_NAME: &str = "docker";

/// Transport for images stored in a remote registry.
pub struct DockerTransport;

impl Transport for DockerTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    fn parse_reference(&self, reference: &str) -> Result<Reference> {
        DockerReference::parse(reference).map(Reference::Docker)
    }

    /// Accepts any syntactically valid repository-name prefix: a bare
    /// registry host, a host/path prefix, or a full pinned identity.
    fn validate_scope(&self, scope: &str) -> Result<()> {
        match scope.split_once('/') {
            None => reference::validate_domain(scope)
                .map_err(|e| ImageError::invalid_scope(scope.to_string(), e.to_string())),
            Some((domain, _)) => {
                reference::validate_domain(domain)
                    .map_err(|e| ImageError::invalid_scope(scope.to_string(), e.to_string()))?;
                NamedReference::parse_normalized(scope)
                    .map(|_| ())
                    .map_err(|e| ImageError::invalid_scope(scope.to_string(), e.to_string()))
            }
        }
    }
}

/// An immutable reference to one image in a remote registry.
///
/// Always pinned: construction guarantees exactly one of tag and digest is
/// set. "No pin" is not a valid persisted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerReference {
    name: NamedReference,
}

impl DockerReference {
    /// Parses a transport-scoped string, which must start with `//`.
    ///
    /// Defaults are filled in: an unqualified name gains the default
    /// registry and namespace, and a name with no pin gains the default tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::docker::DockerReference;
    ///
    /// let reference = DockerReference::parse("//busybox").unwrap();
    /// assert_eq!(
    ///     reference.policy_identity(),
    ///     "docker.io/library/busybox:latest"
    /// );
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let rest = reference.strip_prefix("//").ok_or_else(|| {
            ImageError::invalid_input(format!(
                "docker reference {:?} does not start with //",
                reference
            ))
        })?;
        let name = NamedReference::parse_normalized(rest)?.with_default_tag();
        Self::new(name)
    }

    /// Wraps an already-normalized name. Fails with
    /// `UnsupportedCombination` if the name carries neither a tag nor a
    /// digest; no default is applied here.
    pub fn new(name: NamedReference) -> Result<Self> {
        if name.is_name_only() {
            return Err(ImageError::unsupported_combination(format!(
                "docker reference {} has neither a tag nor a digest",
                name.name()
            )));
        }
        Ok(DockerReference { name })
    }

    /// The normalized, pinned name behind this reference.
    pub fn name(&self) -> &NamedReference {
        &self.name
    }

    /// Renders the transport-scoped string form, `//` followed by the
    /// shortest familiar name with an explicit pin.
    pub fn string_within_transport(&self) -> String {
        format!("//{}", self.name.familiar())
    }

    /// The fully qualified, pinned identity used for trust policy lookup.
    pub fn policy_identity(&self) -> String {
        self.name.to_string()
    }

    /// Broader policy scopes, most specific first: the unpinned repository
    /// name, then each parent namespace, down to the bare registry host.
    pub fn policy_namespaces(&self) -> Vec<String> {
        let mut namespaces = Vec::new();
        let mut current = self.name.name();
        loop {
            namespaces.push(current.clone());
            match current.rfind('/') {
                Some(idx) => current.truncate(idx),
                None => break,
            }
        }
        namespaces
    }
}
