/// Error types for script operations.
///
/// Covers chunk parsing, push-data encoding and address handling.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data ops: {0}")]
    InvalidOpcodeType(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Decoded address payload has the wrong length for its type.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address prefix does not match any known type on any network.
    #[error("address not supported: {0}")]
    UnsupportedAddress(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
