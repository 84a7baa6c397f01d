//! Contract boundary for the image copy/verify pipeline.
//!
//! Manifest parsing, signature verification, and layer transfer live
//! outside this crate; these types define the surface those subsystems
//! consume. `ManifestPayload` deliberately carries raw bytes so this crate
//! never commits to one manifest serialization.

use crate::error::Result;
use crate::transport::Reference;


/// Raw manifest bytes plus the metadata a registry returns alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPayload {
    /// The manifest exactly as stored or served.
    pub bytes: Vec<u8>,
    /// Content digest of the bytes, when the backend knows it.
    pub digest: Option<String>,
    /// Media type reported by the backend, when known.
    pub media_type: Option<String>,
}

/// Read access to one image under a reference.
pub trait ImageSource {
    /// The reference this source was opened from.
    fn reference(&self) -> Reference;

    /// Returns the image manifest.
    fn manifest(&mut self) -> Result<ManifestPayload>;

    /// Returns the image signatures, in order. Empty when unsigned.
    fn signatures(&mut self) -> Result<Vec<Vec<u8>>>;
}

/// Write access to one image under a reference.
pub trait ImageDestination {
    /// The reference this destination was opened from.
    fn reference(&self) -> Reference;

    /// Stores the image manifest.
    fn put_manifest(&mut self, bytes: &[u8]) -> Result<()>;

    /// Stores the image signatures, replacing any existing set.
    fn put_signatures(&mut self, signatures: &[Vec<u8>]) -> Result<()>;
}
