/// Error types for outpoint, coin and input operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// A structured options value is missing a required field or carries a
    /// malformed one.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// A JSON value does not have the expected shape.
    #[error("invalid json: {0}")]
    InvalidJson(String),
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Text could not be parsed as JSON at all.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),
    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
