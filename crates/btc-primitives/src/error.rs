/// Unified error type for primitives operations.
///
/// Covers hex/hash text parsing, Base58 decoding, amount parsing and
/// truncated binary input.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unexpected end of data: wanted {wanted} bytes, {remaining} remaining")]
    UnexpectedEof { wanted: u64, remaining: usize },
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
