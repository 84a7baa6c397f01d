//! The filesystem-backed transport.
//!
//! A reference under this transport is a directory holding one image in the
//! libimage on-disk layout: `manifest.json`, one `<hex>.tar` per layer blob,
//! and `signature-<n>` files counted from 1.
//!
//! The resolved absolute path is computed once at construction from the
//! current filesystem state. Renames and symlink changes afterwards are not
//! tracked, so the identity string can go stale; recomputing on every use
//! was judged not worth the cost.

use crate::digest::Digest;
use crate::error::{ImageError, Result};
use crate::image::{ImageDestination, ImageSource, ManifestPayload};
use crate::transport::{Reference, Transport};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};


/// The lookup name of the filesystem-backed transport.
pub const TRANSPORT_NAME: &str = "dir";

const MANIFEST_FILE: &str = "manifest.json";

/// Transport for images stored in a local directory.
pub struct DirTransport;

impl Transport for DirTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    fn parse_reference(&self, reference: &str) -> Result<Reference> {
        DirReference::new(reference).map(Reference::Directory)
    }

    /// Scopes must be absolute, canonical paths and not the root itself;
    /// `/` would shadow the universal default scope.
    fn validate_scope(&self, scope: &str) -> Result<()> {
        if !scope.starts_with('/') {
            return Err(ImageError::invalid_scope(
                scope,
                "must be an absolute path",
            ));
        }
        if scope == "/" {
            return Err(ImageError::invalid_scope(
                scope,
                "use the generic default scope instead of the root",
            ));
        }
        let cleaned = clean_path(scope);
        if cleaned != scope {
            return Err(ImageError::invalid_scope(
                scope.to_string(),
                format!("uses a non-canonical format, perhaps try {}", cleaned),
            ));
        }
        Ok(())
    }
}

/// An immutable reference to an image directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirReference {
    /// The path as the user gave it. May be relative and contain symlinks;
    /// filesystem operations follow the user's intent and use this form.
    path: String,
    /// Absolute path with symlinks resolved at construction time. Used for
    /// policy identity and namespaces.
    resolved_path: String,
}

impl DirReference {
    /// Creates a reference for a directory path, resolving it to a fully
    /// explicit absolute path. The final component may not exist yet, but
    /// its parent must.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libimage::dir::DirReference;
    ///
    /// let reference = DirReference::new("/var/lib/images/busybox").unwrap();
    /// assert_eq!(reference.policy_identity(), "/var/lib/images/busybox");
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(ImageError::invalid_input("directory path is empty"));
        }
        let resolved = resolve_fully_explicit(Path::new(path))?;
        let resolved_path = resolved
            .into_os_string()
            .into_string()
            .map_err(|_| ImageError::invalid_input("resolved path is not valid UTF-8"))?;
        Ok(DirReference {
            path: path.to_string(),
            resolved_path,
        })
    }

    /// Renders the transport-scoped string form: the user-supplied path.
    pub fn string_within_transport(&self) -> String {
        self.path.clone()
    }

    /// The resolved absolute path, used for trust policy lookup.
    pub fn policy_identity(&self) -> String {
        self.resolved_path.clone()
    }

    /// Parent directories of the resolved path, most specific first. The
    /// filesystem root is never emitted; it is redundant with the universal
    /// default scope.
    pub fn policy_namespaces(&self) -> Vec<String> {
        let mut namespaces = Vec::new();
        let mut current = self.resolved_path.as_str();
        while let Some(idx) = current.rfind('/') {
            if idx == 0 {
                break;
            }
            current = &current[..idx];
            namespaces.push(current.to_string());
        }
        namespaces
    }

    /// Opens this directory for reading.
    pub fn image_source(&self) -> DirImageSource {
        DirImageSource {
            reference: self.clone(),
        }
    }

    /// Opens this directory for writing, creating it if needed.
    pub fn image_destination(&self) -> Result<DirImageDestination> {
        fs::create_dir_all(&self.path).map_err(|e| {
            ImageError::io_with_source(format!("failed to create directory {}", self.path), e)
        })?;
        Ok(DirImageDestination {
            reference: self.clone(),
        })
    }

    /// Deleting images is not supported for this transport.
    pub fn delete_image(&self) -> Result<()> {
        Err(ImageError::unsupported_combination(
            "deleting images is not supported for dir: references",
        ))
    }

    /// Path of the manifest within the directory.
    pub fn manifest_path(&self) -> PathBuf {
        Path::new(&self.path).join(MANIFEST_FILE)
    }

    /// Path of a layer tarball within the directory, named by the encoded
    /// digest without its algorithm prefix.
    pub fn layer_path(&self, digest: &Digest) -> PathBuf {
        Path::new(&self.path).join(format!("{}.tar", digest.encoded()))
    }

    /// Path of a signature within the directory. `index` is 0-based here;
    /// files on disk are numbered from 1.
    pub fn signature_path(&self, index: usize) -> PathBuf {
        Path::new(&self.path).join(format!("signature-{}", index + 1))
    }
}

/// Read side of the directory layout.
pub struct DirImageSource {
    reference: DirReference,
}

impl ImageSource for DirImageSource {
    fn reference(&self) -> Reference {
        Reference::Directory(self.reference.clone())
    }

    fn manifest(&mut self) -> Result<ManifestPayload> {
        let path = self.reference.manifest_path();
        let bytes = fs::read(&path).map_err(|e| {
            ImageError::io_with_source(format!("failed to read {}", path.display()), e)
        })?;
        Ok(ManifestPayload {
            bytes,
            digest: None,
            media_type: None,
        })
    }

    fn signatures(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut signatures = Vec::new();
        for index in 0.. {
            let path = self.reference.signature_path(index);
            match fs::read(&path) {
                Ok(bytes) => signatures.push(bytes),
                Err(e) if e.kind() == ErrorKind::NotFound => break,
                Err(e) => {
                    return Err(ImageError::io_with_source(
                        format!("failed to read {}", path.display()),
                        e,
                    ));
                }
            }
        }
        Ok(signatures)
    }
}

/// Write side of the directory layout.
pub struct DirImageDestination {
    reference: DirReference,
}

impl ImageDestination for DirImageDestination {
    fn reference(&self) -> Reference {
        Reference::Directory(self.reference.clone())
    }

    fn put_manifest(&mut self, bytes: &[u8]) -> Result<()> {
        let path = self.reference.manifest_path();
        fs::write(&path, bytes).map_err(|e| {
            ImageError::io_with_source(format!("failed to write {}", path.display()), e)
        })
    }

    fn put_signatures(&mut self, signatures: &[Vec<u8>]) -> Result<()> {
        for (index, signature) in signatures.iter().enumerate() {
            let path = self.reference.signature_path(index);
            fs::write(&path, signature).map_err(|e| {
                ImageError::io_with_source(format!("failed to write {}", path.display()), e)
            })?;
        }
        Ok(())
    }
}

/// Resolves a path to an absolute, symlink-free form. If the final
/// component does not exist yet, its parent is resolved instead and the
/// component re-appended.
fn resolve_fully_explicit(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let file_name = path.file_name().ok_or_else(|| {
                ImageError::invalid_input(format!(
                    "path {} has no usable final component",
                    path.display()
                ))
            })?;
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let resolved_parent = fs::canonicalize(parent).map_err(|e| {
                ImageError::io_with_source(
                    format!("failed to resolve parent of {}", path.display()),
                    e,
                )
            })?;
            Ok(resolved_parent.join(file_name))
        }
        Err(e) => Err(ImageError::io_with_source(
            format!("failed to resolve {}", path.display()),
            e,
        )),
    }
}

/// Lexically cleans an absolute path: collapses repeated separators and
/// resolves `.` and `..` components, like Go's `filepath.Clean`.
fn clean_path(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }
    if components.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", components.join("/"))
    }
}
