#![deny(missing_docs)]

//! Bitcoin SDK - transaction input data model.
//!
//! Re-exports the workspace crates for convenient single-crate usage.

pub use btc_primitives as primitives;
pub use btc_script as script;
pub use btc_transaction as transaction;
