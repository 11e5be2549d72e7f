//! Spending-pattern classification.
//!
//! Input patterns are matched against a list of stack items so that the
//! same rules serve both signature scripts and witness stacks.

use std::fmt;

/// The standard classification of an output script or spending input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// Spends a null outpoint and mints new coins.
    Coinbase,
    /// Pay to a bare public key.
    Pubkey,
    /// Pay to the Hash160 of a public key.
    Pubkeyhash,
    /// Pay to the Hash160 of a redeem script.
    Scripthash,
    /// Bare m-of-n multisig.
    Multisig,
    /// Unspendable `OP_RETURN` data carrier.
    Nulldata,
    /// Version 0 witness program committing to a key hash.
    WitnessPubkeyhash,
    /// Version 0 witness program committing to a script hash.
    WitnessScripthash,
    /// Anything not matching a standard pattern.
    Unknown,
}

impl ScriptType {
    /// The lowercase name used in JSON and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Coinbase => "coinbase",
            ScriptType::Pubkey => "pubkey",
            ScriptType::Pubkeyhash => "pubkeyhash",
            ScriptType::Scripthash => "scripthash",
            ScriptType::Multisig => "multisig",
            ScriptType::Nulldata => "nulldata",
            ScriptType::WitnessPubkeyhash => "witnesspubkeyhash",
            ScriptType::WitnessScripthash => "witnessscripthash",
            ScriptType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Element encodings
// ---------------------------------------------------------------------------

/// Check whether `sig` is a strict DER signature followed by a hash type byte.
///
/// Empty signatures are rejected here; an empty push is a dummy, not a
/// signature, for classification purposes.
pub fn is_signature_encoding(sig: &[u8]) -> bool {
    let len = sig.len();
    if !(9..=73).contains(&len) {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != len - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= len {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != len {
        return false;
    }

    if sig[2] != 0x02 || len_r == 0 || sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return false;
    }

    if sig[len_r + 4] != 0x02 || len_s == 0 || sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0x00 && sig[len_r + 7] & 0x80 == 0 {
        return false;
    }

    true
}

/// Check whether `key` is a compressed (33-byte) or uncompressed (65-byte)
/// public key encoding.
pub fn is_key_encoding(key: &[u8]) -> bool {
    match key.len() {
        33 => key[0] == 0x02 || key[0] == 0x03,
        65 => key[0] == 0x04,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Input patterns over stack items
// ---------------------------------------------------------------------------

/// A single signature.
pub fn is_pubkey_input(items: &[Vec<u8>]) -> bool {
    items.len() == 1 && is_signature_encoding(&items[0])
}

/// A signature followed by a public key.
pub fn is_pubkeyhash_input(items: &[Vec<u8>]) -> bool {
    items.len() == 2 && is_signature_encoding(&items[0]) && is_key_encoding(&items[1])
}

/// A trailing serialized script that is neither a signature nor a key.
pub fn is_scripthash_input(items: &[Vec<u8>]) -> bool {
    match items.last() {
        Some(redeem) => {
            !redeem.is_empty() && !is_signature_encoding(redeem) && !is_key_encoding(redeem)
        }
        None => false,
    }
}

/// An empty dummy followed by two or more signatures.
pub fn is_multisig_input(items: &[Vec<u8>]) -> bool {
    if is_scripthash_input(items) || items.len() < 3 {
        return false;
    }
    items[0].is_empty() && items[1..].iter().all(|sig| is_signature_encoding(sig))
}

/// Classify stack items with the input patterns, in priority order.
pub fn input_type(items: &[Vec<u8>]) -> ScriptType {
    if is_pubkey_input(items) {
        ScriptType::Pubkey
    } else if is_pubkeyhash_input(items) {
        ScriptType::Pubkeyhash
    } else if is_multisig_input(items) {
        ScriptType::Multisig
    } else if is_scripthash_input(items) {
        ScriptType::Scripthash
    } else {
        ScriptType::Unknown
    }
}
