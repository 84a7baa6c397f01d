//! Repository name parsing and normalization.
//!
//! This module owns the naming grammar for registry-backed references and the
//! defaulting rules that turn a short human-typed name like `busybox` into a
//! fully qualified one like `docker.io/library/busybox`. The default host,
//! namespace, and tag are constants of this crate, so the normalization is
//! reproducible independent of any external naming library.

use crate::digest::Digest;
use crate::error::{ImageError, Result};
use std::fmt;
use std::str::FromStr;


/// Registry host assumed for unqualified repository names.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Namespace segment inserted for single-segment names on the default
/// registry (`busybox` -> `docker.io/library/busybox`).
pub const DEFAULT_NAMESPACE: &str = "library";

/// Tag applied when a reference carries neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

/// Maximum total length of a fully qualified repository name.
const MAX_NAME_LENGTH: usize = 255;

/// A normalized, immutable repository name with an optional pin.
///
/// After construction at most one of `tag` and `digest` is set. If the input
/// carried both, the digest wins and the tag is dropped; this mirrors the
/// longstanding behavior of the upstream naming grammar and is kept for
/// compatibility rather than because it is obviously right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedReference {
    domain: String,
    path: String,
    tag: Option<String>,
    digest: Option<Digest>,
}

impl NamedReference {
    /// Parses a repository name, filling in the default registry and
    /// namespace, without applying a default tag.
    ///
    /// Fails with `InvalidInput` if the repository path violates the
    /// lowercase naming grammar; uppercase characters are rejected outright,
    /// not coerced.
    ///
    /// # Examples
    ///
    /// ```
    /// use libimage::reference::NamedReference;
    ///
    /// let name = NamedReference::parse_normalized("busybox").unwrap();
    /// assert_eq!(name.name(), "docker.io/library/busybox");
    /// assert!(name.is_name_only());
    /// ```
    pub fn parse_normalized(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(ImageError::invalid_input("repository name is empty"));
        }

        // Digest first: everything after the last '@'.
        let (rest, digest) = match raw.rsplit_once('@') {
            Some((rest, dg)) => (rest, Some(Digest::from_str(dg)?)),
            None => (raw, None),
        };

        // Then the tag. A ':' followed by a '/' is a port, not a tag.
        let (name, tag) = match rest.rsplit_once(':') {
            Some((name, tag)) if !tag.contains('/') => (name, Some(tag)),
            _ => (rest, None),
        };

        let (domain, path) = split_domain(name);
        let mut domain = domain.unwrap_or(DEFAULT_REGISTRY).to_string();
        // Hosts are case-insensitive; lowercase before the default-namespace
        // check so `Docker.io/busybox` normalizes exactly like the lowercase
        // form, including the `library` insertion.
        domain.make_ascii_lowercase();
        let mut path = path.to_string();
        if domain == DEFAULT_REGISTRY && !path.contains('/') {
            path = format!("{}/{}", DEFAULT_NAMESPACE, path);
        }

        validate_domain(&domain)?;
        validate_path(&path)?;
        if domain.len() + 1 + path.len() > MAX_NAME_LENGTH {
            return Err(ImageError::invalid_input(format!(
                "repository name exceeds {} characters",
                MAX_NAME_LENGTH
            )));
        }

        let tag = match tag {
            Some(t) => {
                validate_tag(t)?;
                Some(t.to_string())
            }
            None => None,
        };

        // Compatibility quirk: a name can syntactically carry a tag and a
        // digest at the same time. The digest wins and the tag is dropped.
        let tag = if digest.is_some() { None } else { tag };

        Ok(NamedReference {
            domain,
            path,
            tag,
            digest,
        })
    }

    /// Returns the registry host (and optional port) of the name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the slash-separated repository path below the host.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the tag, if this name is tag-pinned.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns the digest, if this name is digest-pinned.
    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    /// True when the name carries neither a tag nor a digest.
    pub fn is_name_only(&self) -> bool {
        self.tag.is_none() && self.digest.is_none()
    }

    /// Returns the fully qualified repository name without any pin.
    pub fn name(&self) -> String {
        format!("{}/{}", self.domain, self.path)
    }

    /// Returns a copy of this name pinned to [`DEFAULT_TAG`] if it carries
    /// no pin; otherwise returns it unchanged.
    pub fn with_default_tag(self) -> Self {
        if self.is_name_only() {
            NamedReference {
                tag: Some(DEFAULT_TAG.to_string()),
                ..self
            }
        } else {
            self
        }
    }

    /// Returns the shortest name a user would type for this reference, with
    /// the default registry and namespace elided but the pin kept.
    pub fn familiar(&self) -> String {
        let mut out = String::new();
        if self.domain != DEFAULT_REGISTRY {
            out.push_str(&self.domain);
            out.push('/');
            out.push_str(&self.path);
        } else {
            match self.path.split_once('/') {
                // `library/busybox` shortens to `busybox`, but deeper paths
                // keep their namespace.
                Some((ns, short)) if ns == DEFAULT_NAMESPACE && !short.contains('/') => {
                    out.push_str(short)
                }
                _ => out.push_str(&self.path),
            }
        }
        self.render_pin(&mut out);
        out
    }

    fn render_pin(&self, out: &mut String) {
        if let Some(digest) = &self.digest {
            out.push('@');
            out.push_str(&digest.to_string());
        } else if let Some(tag) = &self.tag {
            out.push(':');
            out.push_str(tag);
        }
    }
}

impl fmt::Display for NamedReference {
    /// Renders the fully qualified form, with the pin when present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.name();
        self.render_pin(&mut out);
        f.write_str(&out)
    }
}

impl FromStr for NamedReference {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_normalized(s)
    }
}

/// Splits a leading registry host off a repository name. The first segment
/// is a host only if it contains a '.' or ':' or is exactly "localhost".
fn split_domain(name: &str) -> (Option<&str>, &str) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (Some(first), rest)
        }
        _ => (None, name),
    }
}

pub(crate) fn validate_domain(domain: &str) -> Result<()> {
    let (host, port) = match domain.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };
    if let Some(port) = port
        && (port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ImageError::invalid_input(format!(
            "invalid port in registry host {:?}",
            domain
        )));
    }
    if host.is_empty() {
        return Err(ImageError::invalid_input("registry host is empty"));
    }
    let valid_label = |label: &str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    };
    if !host.split('.').all(valid_label) {
        return Err(ImageError::invalid_input(format!(
            "invalid registry host {:?}",
            host
        )));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImageError::invalid_input("repository path is empty"));
    }
    for component in path.split('/') {
        if !is_valid_path_component(component) {
            return Err(ImageError::invalid_input(format!(
                "invalid repository path component {:?}: must match the \
                 lowercase naming grammar",
                component
            )));
        }
    }
    Ok(())
}

/// A path component is lowercase alphanumeric runs joined by a single '.',
/// one or two '_', or one or more '-'. It must start and end alphanumeric.
pub(crate) fn is_valid_path_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if bytes.is_empty() || !is_alnum(bytes[0]) {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if is_alnum(b) {
            i += 1;
            continue;
        }
        let run = match b {
            b'.' => 1,
            b'_' => {
                if bytes.get(i + 1) == Some(&b'_') {
                    2
                } else {
                    1
                }
            }
            b'-' => {
                let mut n = 1;
                while bytes.get(i + n) == Some(&b'-') {
                    n += 1;
                }
                n
            }
            _ => return false,
        };
        // Every separator run must be followed by an alphanumeric byte.
        match bytes.get(i + run) {
            Some(&next) if is_alnum(next) => i += run,
            _ => return false,
        }
    }
    true
}

fn validate_tag(tag: &str) -> Result<()> {
    let bytes = tag.as_bytes();
    let valid = !bytes.is_empty()
        && bytes.len() <= 128
        && (bytes[0].is_ascii_alphanumeric() || bytes[0] == b'_')
        && bytes
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'));
    if !valid {
        return Err(ImageError::invalid_input(format!("invalid tag {:?}", tag)));
    }
    Ok(())
}
