//! Base58 and Base58Check text encoding.
//!
//! Addresses are rendered as Base58Check: the payload followed by the
//! first four bytes of its SHA-256d, encoded with Bitcoin's alphabet.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
pub const CHECKSUM_SIZE: usize = 4;

/// Encode bytes as Base58. Leading zero bytes become leading `'1'`s.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `data` with a 4-byte SHA-256d checksum appended.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_SIZE);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_SIZE]);
    encode(&payload)
}

/// Decode a Base58Check string and verify its checksum.
///
/// Returns the payload with the checksum stripped.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_SIZE {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let split = decoded.len() - CHECKSUM_SIZE;
    let expected = sha256d(&decoded[..split]);
    if decoded[split..] != expected[..CHECKSUM_SIZE] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(split);
    Ok(decoded)
}
