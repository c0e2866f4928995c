//! Content-addressed object identifier using SHA-1

use crate::{Error, Result};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

/// Number of hex characters in a rendered object id
pub const HEX_LEN: usize = 40;

/// A 20-byte SHA-1 digest used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// Create an id from raw digest bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        ObjectId(bytes)
    }

    /// Hash arbitrary data
    pub fn digest(data: &[u8]) -> Self {
        ObjectId(Sha1::digest(data).into())
    }

    /// Finish an incremental hasher into an id
    pub(crate) fn from_hasher(hasher: Sha1) -> Self {
        ObjectId(hasher.finalize().into())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 40-character hex string
    ///
    /// Both cases are accepted; the id always renders lowercase.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != HEX_LEN {
            return Err(Error::InvalidArgument(format!(
                "object id must be {} hex characters, got {} ({:?})",
                HEX_LEN,
                s.len(),
                s
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidArgument(format!("object id {:?}: {}", s, e)))?;
        Ok(ObjectId(bytes))
    }

    /// Get a short prefix for display (first 7 chars, like git)
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// Subdirectory name under `objects/` (first two hex chars)
    pub fn prefix(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// File name inside the prefix directory (remaining 38 hex chars)
    pub fn suffix(&self) -> String {
        hex::encode(&self.0[1..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectId::from_hex(s)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Anything a store operation accepts as an object id.
///
/// Strings are validated here, so a malformed digest fails with
/// [`Error::InvalidArgument`] before the filesystem is touched.
pub trait IntoObjectId {
    fn into_object_id(self) -> Result<ObjectId>;
}

impl IntoObjectId for ObjectId {
    fn into_object_id(self) -> Result<ObjectId> {
        Ok(self)
    }
}

impl IntoObjectId for &ObjectId {
    fn into_object_id(self) -> Result<ObjectId> {
        Ok(*self)
    }
}

impl IntoObjectId for &str {
    fn into_object_id(self) -> Result<ObjectId> {
        ObjectId::from_hex(self)
    }
}

impl IntoObjectId for &String {
    fn into_object_id(self) -> Result<ObjectId> {
        ObjectId::from_hex(self)
    }
}
