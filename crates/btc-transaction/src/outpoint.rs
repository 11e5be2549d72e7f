//! References to previously created transaction outputs.
//!
//! An [`Outpoint`] is a transaction id plus an output index. The all-zero
//! hash with index `0xFFFFFFFF` is reserved for coinbase inputs.
//!
//! # Wire format
//!
//! | Field | Size                     |
//! |-------|--------------------------|
//! | hash  | 32 bytes (internal order) |
//! | index | 4 bytes (LE)             |

use std::fmt;

use btc_primitives::chainhash::Hash;
use btc_primitives::util::{BtcReader, BtcWriter};
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// Hash of the null outpoint.
pub const NULL_HASH: Hash = Hash::ZERO;

/// Index of the null outpoint.
pub const NULL_INDEX: u32 = 0xFFFF_FFFF;

/// Encoded size of an outpoint in bytes.
pub const OUTPOINT_SIZE: usize = 36;

/// A reference to output `index` of transaction `hash`.
///
/// JSON carries the hash in display (byte-reversed) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    /// Transaction id in internal byte order.
    pub hash: Hash,
    /// Output index within that transaction.
    pub index: u32,
}

/// Structured construction value for an [`Outpoint`].
///
/// Unlike the JSON form, `hash` is given in internal (storage) order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutpointOptions {
    /// 64 hex characters, internal byte order.
    pub hash: String,
    /// Output index.
    pub index: u32,
}

impl From<Outpoint> for OutpointOptions {
    fn from(outpoint: Outpoint) -> Self {
        OutpointOptions {
            hash: outpoint.hash.to_internal_hex(),
            index: outpoint.index,
        }
    }
}

impl Outpoint {
    /// Create an outpoint from a hash in internal order and an index.
    pub fn new(hash: Hash, index: u32) -> Self {
        Outpoint { hash, index }
    }

    /// The coinbase sentinel: zero hash, index `0xFFFFFFFF`.
    pub fn null() -> Self {
        Outpoint {
            hash: NULL_HASH,
            index: NULL_INDEX,
        }
    }

    /// Whether this is the coinbase sentinel.
    pub fn is_null(&self) -> bool {
        self.hash == NULL_HASH && self.index == NULL_INDEX
    }

    /// Build an outpoint from structured options.
    ///
    /// # Returns
    /// The outpoint, or `InvalidOptions` if the hash is not 64 hex characters.
    pub fn from_options(options: &OutpointOptions) -> Result<Self, TransactionError> {
        let hash = Hash::from_internal_hex(&options.hash)
            .map_err(|e| TransactionError::InvalidOptions(format!("prevout hash: {}", e)))?;
        Ok(Outpoint::new(hash, options.index))
    }

    /// Reference output `index` of the transaction with id `txid`.
    pub fn from_tx_id(txid: Hash, index: u32) -> Self {
        Outpoint::new(txid, index)
    }

    /// Deserialize an outpoint from a `BtcReader`.
    ///
    /// # Returns
    /// The outpoint, or a `SerializationError` if fewer than 36 bytes remain.
    pub fn read_from(reader: &mut BtcReader) -> Result<Self, TransactionError> {
        let hash = reader.read_hash().map_err(|e| {
            TransactionError::SerializationError(format!("reading prevout hash: {}", e))
        })?;
        let index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading prevout index: {}", e))
        })?;
        Ok(Outpoint { hash, index })
    }

    /// Serialize this outpoint into a `BtcWriter`.
    pub fn write_to(&self, writer: &mut BtcWriter) {
        writer.write_hash(&self.hash);
        writer.write_u32_le(self.index);
    }

    /// Serialize to exactly 36 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BtcWriter::with_capacity(OUTPOINT_SIZE);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Deserialize from exactly 36 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        if bytes.len() != OUTPOINT_SIZE {
            return Err(TransactionError::SerializationError(format!(
                "outpoint must be {} bytes, got {}",
                OUTPOINT_SIZE,
                bytes.len()
            )));
        }
        Self::read_from(&mut BtcReader::new(bytes))
    }

    /// JSON form: `{hash: display-order hex, index}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "hash": self.hash.to_string(),
            "index": self.index,
        })
    }

    /// Parse the JSON form. The hash is reversed back to internal order.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TransactionError> {
        Outpoint::deserialize(json)
            .map_err(|e| TransactionError::InvalidJson(format!("prevout: {}", e)))
    }
}

/// Diagnostic form: `<Outpoint: {internal hex}/{index}>`.
impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Outpoint: {}/{}>", self.hash.to_internal_hex(), self.index)
    }
}
