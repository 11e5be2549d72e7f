/// Bitcoin SDK - hashing, chain hashes, amounts and binary cursors.
///
/// This crate provides the leaf building blocks for the SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction identifiers
/// - Base58 / Base58Check encoding
/// - Satoshi/BTC amount conversion
/// - Compact-size integers and the `BtcReader` / `BtcWriter` byte cursors

pub mod amount;
pub mod base58;
pub mod chainhash;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
