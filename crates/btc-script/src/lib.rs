/// Bitcoin SDK - scripts, witnesses, spending-pattern classification and
/// addresses.
///
/// Scripts and witnesses are kept as raw bytes and classified on demand:
/// as output scripts (what an output pays to) or as spending data (what an
/// input most likely spends).

pub mod address;
pub mod chunk;
pub mod classify;
pub mod opcodes;
pub mod script;
pub mod witness;

mod error;
pub use address::{Address, AddressType, Network};
pub use chunk::ScriptChunk;
pub use classify::ScriptType;
pub use error::ScriptError;
pub use script::Script;
pub use witness::Witness;
