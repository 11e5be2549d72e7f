//! Chain hash type for transaction identification.
//!
//! Provides a `Hash` type: 32 bytes kept in internal (storage) order and
//! displayed as byte-reversed hex, matching bitcoind's legacy convention
//! for transaction and block identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Length of a Hash rendered as hex text.
pub const HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// A 32-byte hash used for transaction identifiers.
///
/// `Display`, `FromStr` and serde all use the reversed (display) byte
/// order. Use [`Hash::to_internal_hex`] / [`Hash::from_internal_hex`] for
/// the storage order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Create a Hash from bytes in internal order.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a slice that must be exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse display-order hex (byte-reversed, as shown by block explorers).
    ///
    /// Exactly 64 hex characters are required; case is ignored.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut hash = Self::from_internal_hex(hex_str)?;
        hash.0.reverse();
        Ok(hash)
    }

    /// Parse storage-order hex.
    ///
    /// Exactly 64 hex characters are required; case is ignored.
    pub fn from_internal_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_STRING_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} hex characters, got {}",
                HASH_STRING_SIZE,
                hex_str.len()
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut arr)?;
        Ok(Hash(arr))
    }

    /// Render storage-order hex.
    pub fn to_internal_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Return the bytes in display order.
    pub fn reversed(&self) -> [u8; HASH_SIZE] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    /// Check whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Display the hash as byte-reversed hex.
///
/// Internal bytes `[0x06, 0xe5, ...]` display as `"...e506"`.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.reversed()))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute SHA-256d of `data` as a Hash (e.g. a transaction id).
pub fn double_hash_h(data: &[u8]) -> Hash {
    Hash(sha256d(data))
}
