/// Bitcoin SDK - outpoints, coins and transaction inputs.
///
/// Provides the input data model with raw, extended and JSON codecs, and
/// resolution of the type, address and redeem script an input spends.

pub mod coin;
pub mod input;
pub mod outpoint;

mod error;
pub use coin::Coin;
pub use error::TransactionError;
pub use input::{
    AddressMatcher, Input, InputArg, InputJson, InputOptions, MutableInput, SpendingInput,
    DEFAULT_SEQUENCE_NUMBER,
};
pub use outpoint::{Outpoint, OutpointOptions};

#[cfg(test)]
mod tests;
