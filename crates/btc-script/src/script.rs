//! Bitcoin script container and classification.
//!
//! A [`Script`] holds raw bytes. Classification parses the bytes into
//! chunks on demand; malformed scripts are classified as unknown rather
//! than rejected.

use std::fmt;

use btc_primitives::hash::{hash160, sha256};
use tracing::debug;

use crate::address::{Address, AddressType};
use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::classify::{self, is_key_encoding, ScriptType};
use crate::opcodes::*;
use crate::ScriptError;

/// A Bitcoin script as raw bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex string.
    ///
    /// # Arguments
    /// * `hex_str` - Hex-encoded script bytes.
    ///
    /// # Returns
    /// The script, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Encode the script as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Render the script as space-separated ASM tokens.
    ///
    /// Data pushes appear as hex. A script that fails to parse renders
    /// as `[error]`.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => "[error]".to_string(),
        }
    }

    /// Borrow the raw script bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the script into a vector of decoded chunks.
    ///
    /// # Returns
    /// A vector of `ScriptChunk` values, or an error if the script is malformed.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Chunks of a well-formed script; `None` if parsing fails.
    fn parsed(&self) -> Option<Vec<ScriptChunk>> {
        match self.chunks() {
            Ok(chunks) => Some(chunks),
            Err(e) => {
                debug!(script = %self.to_hex(), error = %e, "script does not parse");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append data bytes to the script with the minimal push prefix.
    ///
    /// # Arguments
    /// * `data` - The data bytes to push.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the data is too large.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append raw opcodes to the script.
    ///
    /// Rejects push data opcodes (`OP_DATA_1`..=`OP_PUSHDATA4`); use
    /// `append_push_data` for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        for &op in opcodes {
            if (OP_DATA_1..=OP_PUSHDATA4).contains(&op) {
                return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
            }
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }

    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn pay_to_pubkey_hash(hash: &[u8; 20]) -> Self {
        let mut bytes = vec![OP_DUP, OP_HASH160, OP_DATA_20];
        bytes.extend_from_slice(hash);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(bytes)
    }

    /// `OP_HASH160 <hash> OP_EQUAL`
    pub fn pay_to_script_hash(hash: &[u8; 20]) -> Self {
        let mut bytes = vec![OP_HASH160, OP_DATA_20];
        bytes.extend_from_slice(hash);
        bytes.push(OP_EQUAL);
        Script(bytes)
    }

    /// `OP_0 <20-byte hash>`
    pub fn pay_to_witness_pubkey_hash(hash: &[u8; 20]) -> Self {
        let mut bytes = vec![OP_0, OP_DATA_20];
        bytes.extend_from_slice(hash);
        Script(bytes)
    }

    /// `OP_0 <32-byte hash>`
    pub fn pay_to_witness_script_hash(hash: &[u8; 32]) -> Self {
        let mut bytes = vec![OP_0, OP_DATA_32];
        bytes.extend_from_slice(hash);
        Script(bytes)
    }

    // -----------------------------------------------------------------------
    // Output patterns
    // -----------------------------------------------------------------------

    /// `<pubkey> OP_CHECKSIG`
    pub fn is_pubkey(&self) -> bool {
        match self.parsed().as_deref() {
            Some([key, last]) => {
                last.op == OP_CHECKSIG && key.data.as_deref().map_or(false, is_key_encoding)
            }
            _ => false,
        }
    }

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_pubkeyhash(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG` with `1 <= m <= n`.
    pub fn is_multisig(&self) -> bool {
        let chunks = match self.parsed() {
            Some(c) if c.len() >= 4 => c,
            _ => return false,
        };
        let last = chunks.len() - 1;
        if chunks[last].op != OP_CHECKMULTISIG {
            return false;
        }
        let m = match small_int_value(chunks[0].op) {
            Some(m) if m >= 1 => m as usize,
            _ => return false,
        };
        let n = match small_int_value(chunks[last - 1].op) {
            Some(n) => n as usize,
            None => return false,
        };
        let keys = &chunks[1..last - 1];
        m <= n
            && keys.len() == n
            && keys
                .iter()
                .all(|k| k.data.as_deref().map_or(false, is_key_encoding))
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_scripthash(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// `OP_RETURN` followed only by pushes.
    pub fn is_nulldata(&self) -> bool {
        match self.parsed().as_deref() {
            Some([first, rest @ ..]) => first.op == OP_RETURN && rest.iter().all(ScriptChunk::is_push),
            _ => false,
        }
    }

    /// `OP_0 <20 bytes>`
    pub fn is_witness_pubkeyhash(&self) -> bool {
        let b = &self.0;
        b.len() == 22 && b[0] == OP_0 && b[1] == OP_DATA_20
    }

    /// `OP_0 <32 bytes>`
    pub fn is_witness_scripthash(&self) -> bool {
        let b = &self.0;
        b.len() == 34 && b[0] == OP_0 && b[1] == OP_DATA_32
    }

    /// Classify this script as an output script.
    pub fn get_type(&self) -> ScriptType {
        if self.is_pubkey() {
            ScriptType::Pubkey
        } else if self.is_pubkeyhash() {
            ScriptType::Pubkeyhash
        } else if self.is_scripthash() {
            ScriptType::Scripthash
        } else if self.is_witness_pubkeyhash() {
            ScriptType::WitnessPubkeyhash
        } else if self.is_witness_scripthash() {
            ScriptType::WitnessScripthash
        } else if self.is_multisig() {
            ScriptType::Multisig
        } else if self.is_nulldata() {
            ScriptType::Nulldata
        } else {
            ScriptType::Unknown
        }
    }

    /// The address this output script pays to, if it has one.
    ///
    /// A bare public key output is reported as the key's pubkeyhash address.
    pub fn get_address(&self) -> Option<Address> {
        let b = &self.0;
        if self.is_pubkey() {
            let key = self.parsed()?.first()?.data.clone()?;
            Some(Address::from_public_key(&key))
        } else if self.is_pubkeyhash() {
            Some(Address::new(AddressType::Pubkeyhash, b[3..23].to_vec()))
        } else if self.is_scripthash() {
            Some(Address::new(AddressType::Scripthash, b[2..22].to_vec()))
        } else if self.is_witness_pubkeyhash() {
            Some(Address::new(AddressType::WitnessPubkeyhash, b[2..22].to_vec()))
        } else if self.is_witness_scripthash() {
            Some(Address::new(AddressType::WitnessScripthash, b[2..34].to_vec()))
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Input patterns
    // -----------------------------------------------------------------------

    /// Whether every chunk only pushes data.
    pub fn is_push_only(&self) -> bool {
        self.parsed()
            .map_or(false, |chunks| chunks.iter().all(ScriptChunk::is_push))
    }

    /// The stack items a push-only script would leave, in order.
    ///
    /// `None` if the script does not parse or contains a non-push opcode.
    pub fn items(&self) -> Option<Vec<Vec<u8>>> {
        self.parsed()?.iter().map(ScriptChunk::stack_item).collect()
    }

    /// Whether this signature script spends a pay-to-script-hash output.
    ///
    /// The last chunk must be an explicit data push holding the redeem script.
    pub fn is_scripthash_input(&self) -> bool {
        let chunks = match self.parsed() {
            Some(c) => c,
            None => return false,
        };
        match self.items() {
            Some(items) => {
                chunks.last().map_or(false, |c| c.data.is_some())
                    && classify::is_scripthash_input(&items)
            }
            None => false,
        }
    }

    /// Guess the type of output this signature script spends.
    pub fn get_input_type(&self) -> ScriptType {
        let items = match self.items() {
            Some(items) => items,
            None => return ScriptType::Unknown,
        };
        match classify::input_type(&items) {
            ScriptType::Scripthash if !self.is_scripthash_input() => ScriptType::Unknown,
            kind => kind,
        }
    }

    /// Guess the address this signature script spends from.
    pub fn get_input_address(&self) -> Option<Address> {
        let items = self.items()?;
        match self.get_input_type() {
            ScriptType::Pubkeyhash => Some(Address::from_public_key(&items[1])),
            ScriptType::Scripthash => Some(Address::from_redeem_script(items.last()?)),
            _ => None,
        }
    }

    /// The redeem script: the last data push of a push-only script.
    pub fn get_redeem(&self) -> Option<Script> {
        if !self.is_push_only() {
            return None;
        }
        let chunks = self.parsed()?;
        let redeem = chunks.last()?.data.as_deref()?;
        Some(Script::from_bytes(redeem))
    }

    /// Hash160 of the script bytes.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.0)
    }

    /// SHA-256 of the script bytes.
    pub fn sha256(&self) -> [u8; 32] {
        sha256(&self.0)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_asm())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
