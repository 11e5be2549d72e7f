//! Hash functions used by script classification and address derivation.
//!
//! SHA-256 commits witness scripts, SHA-256d produces identifiers and
//! checksums, and Hash160 (RIPEMD-160 over SHA-256) commits keys and
//! legacy redeem scripts.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute SHA-256(SHA-256(data)).
///
/// Used for transaction identifiers and Base58Check checksums.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the RIPEMD-160 digest of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// This is the 20-byte commitment behind pubkeyhash and scripthash
/// outputs.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}
