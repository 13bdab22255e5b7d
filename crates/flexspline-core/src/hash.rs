//! Content-based hashing for change detection

use crate::Vec3;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 based content hash.
///
/// Used to seed deterministic randomization from layer and instance names
/// and to fingerprint spline point locations.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute a hash from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        Self(result.into())
    }

    /// Compute a hash from a string
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The leading four bytes as a little-endian `u32`
    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Identity fingerprint of a spline point, derived from its local location.
///
/// Points carry no stable id across edits, so a record is matched to a live
/// point by comparing these. Two points at the same location share a hash.
#[derive(Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointHash(pub u32);

impl PointHash {
    pub fn of_location(location: Vec3) -> Self {
        let mut bytes = [0u8; 12];
        // +0.0 folds negative zero into positive zero
        for (i, c) in [location.x, location.y, location.z].iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&(c + 0.0).to_le_bytes());
        }
        Self(ContentHash::from_bytes(&bytes).to_u32())
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PointHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointHash({:08x})", self.0)
    }
}

impl fmt::Display for PointHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
