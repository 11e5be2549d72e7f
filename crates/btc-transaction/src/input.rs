//! Transaction inputs spending a previous output.
//!
//! An input owns the [`Outpoint`] it spends, the signature script, the
//! witness stack, a sequence number and, when known, a [`Coin`] snapshot
//! of the output being spent.
//!
//! Two representations share the [`SpendingInput`] contract:
//!
//! - [`MutableInput`] is a builder with public fields. Every derived query
//!   is recomputed.
//! - [`Input`] is finalized. Its fields are private and the guessed type
//!   and address are computed at most once.
//!
//! # Wire format (raw)
//!
//! | Field    | Size                         |
//! |----------|------------------------------|
//! | prevout  | 36 bytes                     |
//! | script   | VarInt length + script bytes |
//! | sequence | 4 bytes (LE)                 |
//!
//! The extended format appends the witness stack: a VarInt item count,
//! then each item length-prefixed.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;
use std::sync::OnceLock;

use btc_primitives::amount::to_btc;
use btc_primitives::chainhash::Hash;
use btc_primitives::util::{BtcReader, BtcWriter};
use btc_script::{Address, Network, Script, ScriptType, Witness};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace};

use crate::coin::{Coin, CoinJson, MEMPOOL_HEIGHT};
use crate::outpoint::{Outpoint, OutpointOptions};
use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

// ---------------------------------------------------------------------------
// Address sets
// ---------------------------------------------------------------------------

/// A set of address hashes (lowercase hex) an input can be tested against.
pub trait AddressMatcher {
    /// Whether `hash` is a member of the set.
    fn contains_hash(&self, hash: &str) -> bool;
}

impl AddressMatcher for str {
    fn contains_hash(&self, hash: &str) -> bool {
        self == hash
    }
}

impl AddressMatcher for String {
    fn contains_hash(&self, hash: &str) -> bool {
        self.as_str() == hash
    }
}

impl<T: AsRef<str>> AddressMatcher for [T] {
    fn contains_hash(&self, hash: &str) -> bool {
        self.iter().any(|h| h.as_ref() == hash)
    }
}

impl<T: AsRef<str>> AddressMatcher for Vec<T> {
    fn contains_hash(&self, hash: &str) -> bool {
        self.as_slice().contains_hash(hash)
    }
}

impl<T, S> AddressMatcher for HashSet<T, S>
where
    T: Borrow<str> + Eq + std::hash::Hash,
    S: BuildHasher,
{
    fn contains_hash(&self, hash: &str) -> bool {
        self.contains(hash)
    }
}

impl<K, V, S> AddressMatcher for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + std::hash::Hash,
    S: BuildHasher,
{
    fn contains_hash(&self, hash: &str) -> bool {
        self.contains_key(hash)
    }
}

impl<K: Borrow<str> + Ord, V> AddressMatcher for BTreeMap<K, V> {
    fn contains_hash(&self, hash: &str) -> bool {
        self.contains_key(hash)
    }
}

// ---------------------------------------------------------------------------
// Spending contract
// ---------------------------------------------------------------------------

/// Guess the spent output type from the spending data alone.
///
/// The witness is consulted first when it has items; an unknown witness
/// result falls through to the signature script.
fn guess_type(witness: &Witness, script: &Script) -> ScriptType {
    if !witness.is_empty() {
        let kind = witness.get_input_type();
        if kind != ScriptType::Unknown {
            return kind;
        }
        trace!("witness pattern unknown, classifying signature script");
    }
    script.get_input_type()
}

/// Guess the spent address from the spending data alone.
fn guess_address(witness: &Witness, script: &Script) -> Option<Address> {
    if !witness.is_empty() {
        if let Some(address) = witness.get_input_address() {
            return Some(address);
        }
        trace!("no witness address, trying signature script");
    }
    script.get_input_address()
}

/// The capability contract shared by every input representation.
///
/// Implementors supply field access; resolution, serialization and
/// inspection are provided.
pub trait SpendingInput {
    /// The output being spent.
    fn prevout(&self) -> &Outpoint;
    /// The signature script.
    fn script(&self) -> &Script;
    /// The witness stack, possibly empty.
    fn witness(&self) -> &Witness;
    /// Snapshot of the output being spent, if known.
    fn coin(&self) -> Option<&Coin>;
    /// The sequence number.
    fn sequence(&self) -> u32;

    /// Type guessed from the witness and script, ignoring any coin.
    fn guessed_type(&self) -> ScriptType {
        guess_type(self.witness(), self.script())
    }

    /// Address guessed from the witness and script, ignoring any coin.
    fn guessed_address(&self) -> Option<Address> {
        guess_address(self.witness(), self.script())
    }

    /// Whether this input spends the null outpoint.
    fn is_coinbase(&self) -> bool {
        self.prevout().is_null()
    }

    /// Whether the sequence number is `0xFFFFFFFF`.
    fn is_final(&self) -> bool {
        self.sequence() == DEFAULT_SEQUENCE_NUMBER
    }

    /// Resolve the type of the output being spent.
    ///
    /// Coinbase inputs are `coinbase`; a known coin is authoritative;
    /// otherwise the type is guessed from the witness, then the script.
    fn get_type(&self) -> ScriptType {
        if self.is_coinbase() {
            return ScriptType::Coinbase;
        }
        if let Some(coin) = self.coin() {
            return coin.get_type();
        }
        self.guessed_type()
    }

    /// Resolve the address of the output being spent, in the same order as
    /// [`SpendingInput::get_type`]. Coinbase inputs have none.
    fn get_address(&self) -> Option<Address> {
        if self.is_coinbase() {
            return None;
        }
        if let Some(coin) = self.coin() {
            return coin.get_address();
        }
        self.guessed_address()
    }

    /// Resolve the redeem script of a wrapped spend.
    ///
    /// Unwraps at most one level: a script-hash spend whose redeem script is
    /// itself a witness script-hash program resolves to the witness script.
    fn get_redeem(&self) -> Option<Script> {
        if self.is_coinbase() {
            return None;
        }

        let coin = match self.coin() {
            Some(coin) => coin,
            None => {
                if self.script().is_scripthash_input() {
                    let redeem = self.script().get_redeem()?;
                    if redeem.is_witness_scripthash() {
                        return self.witness().get_redeem();
                    }
                    return Some(redeem);
                }
                if self.witness().is_scripthash_input() {
                    return self.witness().get_redeem();
                }
                return None;
            }
        };

        let mut redeem = None;
        let mut prev = Some(coin.script.clone());

        if coin.script.is_scripthash() {
            prev = self.script().get_redeem();
            redeem = prev.clone();
        }

        if prev.map_or(false, |p| p.is_witness_scripthash()) {
            redeem = self.witness().get_redeem();
        }

        redeem
    }

    /// Output type of the redeem script, if one resolves.
    fn get_subtype(&self) -> Option<ScriptType> {
        if self.is_coinbase() {
            return None;
        }
        self.get_redeem().map(|redeem| redeem.get_type())
    }

    /// Raw hash of the resolved address.
    fn get_hash(&self) -> Option<Vec<u8>> {
        self.get_address().map(|a| a.get_hash().to_vec())
    }

    /// Hex hash of the resolved address.
    fn get_hash_hex(&self) -> Option<String> {
        self.get_address().map(|a| a.get_hash_hex())
    }

    /// Whether the resolved address hash is in `addresses`.
    ///
    /// Always false when no address resolves.
    fn test<M: AddressMatcher + ?Sized>(&self, addresses: &M) -> bool
    where
        Self: Sized,
    {
        match self.get_hash_hex() {
            Some(hash) => addresses.contains_hash(&hash),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the raw form into a `BtcWriter`. The witness is not included.
    fn write_to(&self, writer: &mut BtcWriter) {
        self.prevout().write_to(writer);
        writer.write_var_bytes(self.script().to_bytes());
        writer.write_u32_le(self.sequence());
    }

    /// Serialize the raw form.
    fn to_raw(&self) -> Vec<u8> {
        let mut writer = BtcWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialize the raw form followed by the witness.
    fn write_extended(&self, writer: &mut BtcWriter) {
        self.write_to(writer);
        self.witness().write_to(writer);
    }

    /// Serialize the extended form.
    fn to_extended(&self) -> Vec<u8> {
        let mut writer = BtcWriter::new();
        self.write_extended(&mut writer);
        writer.into_bytes()
    }

    /// JSON form with the address rendered for `network`.
    fn to_json_for(&self, network: Network) -> InputJson {
        InputJson {
            prevout: *self.prevout(),
            coin: self.coin().map(|c| c.to_json_for(network)),
            script: self.script().clone(),
            witness: self.witness().clone(),
            sequence: self.sequence(),
            address: self
                .get_address()
                .map(|a| a.with_network(network).to_base58()),
        }
    }

    /// JSON form with a mainnet address.
    fn to_json(&self) -> InputJson {
        self.to_json_for(Network::Mainnet)
    }

    /// Diagnostic projection of the resolved fields.
    fn inspect(&self) -> InputInspection {
        let coin = match self.coin() {
            Some(coin) => InspectedCoin::Known(coin.to_json()),
            None => InspectedCoin::Placeholder(PlaceholderCoin::for_prevout(self.prevout())),
        };
        InputInspection {
            kind: self.get_type(),
            subtype: self.get_subtype(),
            address: self.get_address().map(|a| a.to_base58()),
            value: to_btc(self.coin().map_or(0, |c| c.value)),
            script: self.script().clone(),
            witness: self.witness().clone(),
            redeem: self.get_redeem(),
            sequence: self.sequence(),
            prevout: *self.prevout(),
            coin,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder form
// ---------------------------------------------------------------------------

/// An input under construction. Nothing is cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutableInput {
    /// The output being spent.
    pub prevout: Outpoint,
    /// The signature script.
    pub script: Script,
    /// The witness stack.
    pub witness: Witness,
    /// The sequence number.
    pub sequence: u32,
    /// Snapshot of the output being spent, if known.
    pub coin: Option<Coin>,
}

impl MutableInput {
    /// Create an input spending `prevout` with an empty script and witness
    /// and the default sequence.
    pub fn new(prevout: Outpoint) -> Self {
        MutableInput {
            prevout,
            script: Script::new(),
            witness: Witness::new(),
            sequence: DEFAULT_SEQUENCE_NUMBER,
            coin: None,
        }
    }

    /// Freeze into an [`Input`].
    pub fn finalize(self) -> Input {
        Input {
            prevout: self.prevout,
            script: self.script,
            witness: self.witness,
            sequence: self.sequence,
            coin: self.coin,
            cached_type: OnceLock::new(),
            cached_address: OnceLock::new(),
        }
    }
}

impl SpendingInput for MutableInput {
    fn prevout(&self) -> &Outpoint {
        &self.prevout
    }

    fn script(&self) -> &Script {
        &self.script
    }

    fn witness(&self) -> &Witness {
        &self.witness
    }

    fn coin(&self) -> Option<&Coin> {
        self.coin.as_ref()
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }
}

// ---------------------------------------------------------------------------
// Finalized form
// ---------------------------------------------------------------------------

/// A finalized input.
///
/// The guessed type and address are computed on first use and kept.
/// Use [`Input::into_mutable`] to make changes.
#[derive(Clone, Debug)]
pub struct Input {
    prevout: Outpoint,
    script: Script,
    witness: Witness,
    sequence: u32,
    coin: Option<Coin>,
    cached_type: OnceLock<ScriptType>,
    cached_address: OnceLock<Option<Address>>,
}

/// Structured construction value for an [`Input`].
///
/// Deserializable from JSON: `script` is hex, `witness` an array of hex
/// items, `coin` the coin JSON form. Only `prevout` is required.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InputOptions {
    /// The output being spent.
    pub prevout: OutpointOptions,
    /// Signature script; empty when absent.
    #[serde(default)]
    pub script: Script,
    /// Witness stack; empty when absent.
    #[serde(default)]
    pub witness: Witness,
    /// Sequence number; `0xFFFFFFFF` when absent.
    #[serde(default)]
    pub sequence: Option<u32>,
    /// Snapshot of the output being spent.
    #[serde(default)]
    pub coin: Option<Coin>,
}

impl InputOptions {
    /// Options spending `prevout` with everything else defaulted.
    pub fn new(prevout: OutpointOptions) -> Self {
        InputOptions {
            prevout,
            script: Script::new(),
            witness: Witness::new(),
            sequence: None,
            coin: None,
        }
    }
}

/// Either a built input or the options to build one.
#[derive(Clone, Debug)]
pub enum InputArg {
    /// An already constructed input.
    Input(Input),
    /// Options still to be validated.
    Options(InputOptions),
}

impl InputArg {
    /// Resolve into an [`Input`], validating options if necessary.
    pub fn into_input(self) -> Result<Input, TransactionError> {
        match self {
            InputArg::Input(input) => Ok(input),
            InputArg::Options(options) => Input::from_options(options),
        }
    }
}

impl From<Input> for InputArg {
    fn from(input: Input) -> Self {
        InputArg::Input(input)
    }
}

impl From<InputOptions> for InputArg {
    fn from(options: InputOptions) -> Self {
        InputArg::Options(options)
    }
}

/// JSON representation of an input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJson {
    /// Prevout with the hash in display order.
    pub prevout: Outpoint,
    /// The coin, or null.
    pub coin: Option<CoinJson>,
    /// Signature script hex.
    pub script: Script,
    /// Witness items as hex.
    pub witness: Witness,
    /// Sequence number.
    pub sequence: u32,
    /// Resolved address, or null. Ignored when parsing.
    #[serde(default)]
    pub address: Option<String>,
}

impl Input {
    /// Build an input from structured options.
    ///
    /// # Returns
    /// The input, or `InvalidOptions` if the prevout hash is malformed.
    pub fn from_options(options: InputOptions) -> Result<Self, TransactionError> {
        let prevout = Outpoint::from_options(&options.prevout)?;
        Ok(MutableInput {
            prevout,
            script: options.script,
            witness: options.witness,
            sequence: options.sequence.unwrap_or(DEFAULT_SEQUENCE_NUMBER),
            coin: options.coin,
        }
        .finalize())
    }

    /// Build an input from an options value given as JSON.
    ///
    /// Fails with `InvalidOptions` if the value is null, `sequence` is
    /// present but not a 32-bit unsigned number, or any other field is
    /// malformed.
    pub fn from_options_value(value: &serde_json::Value) -> Result<Self, TransactionError> {
        if value.is_null() {
            return Err(TransactionError::InvalidOptions(
                "input data is required".to_string(),
            ));
        }
        let options = InputOptions::deserialize(value)
            .map_err(|e| TransactionError::InvalidOptions(e.to_string()))?;
        Self::from_options(options)
    }

    /// Deserialize the raw form from a `BtcReader`.
    ///
    /// The reader is left positioned after the input.
    ///
    /// # Returns
    /// The input, or a `SerializationError` if the data is truncated or a
    /// length prefix overruns it.
    pub fn read_from(reader: &mut BtcReader) -> Result<Self, TransactionError> {
        let prevout = Outpoint::read_from(reader)?;

        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading script: {}", e))
        })?;
        let script = Script::from_bytes(script);

        let sequence = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence: {}", e))
        })?;

        Ok(MutableInput {
            prevout,
            script,
            witness: Witness::new(),
            sequence,
            coin: None,
        }
        .finalize())
    }

    /// Deserialize the extended form (raw form then witness).
    pub fn read_extended(reader: &mut BtcReader) -> Result<Self, TransactionError> {
        let mut input = Self::read_from(reader)?.into_mutable();
        input.witness = Witness::read_from(reader).map_err(|e| {
            TransactionError::SerializationError(format!("reading witness: {}", e))
        })?;
        Ok(input.finalize())
    }

    /// Deserialize the raw form. Trailing bytes are an error.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = BtcReader::new(bytes);
        let input = Self::read_from(&mut reader).map_err(|e| {
            debug!(error = %e, remaining = reader.remaining(), "raw input decode failed");
            e
        })?;
        expect_consumed(&reader)?;
        Ok(input)
    }

    /// Deserialize the extended form. Trailing bytes are an error.
    pub fn from_extended(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = BtcReader::new(bytes);
        let input = Self::read_extended(&mut reader).map_err(|e| {
            debug!(error = %e, remaining = reader.remaining(), "extended input decode failed");
            e
        })?;
        expect_consumed(&reader)?;
        Ok(input)
    }

    /// Parse the JSON form.
    ///
    /// `sequence` must be a number; the `address` field is ignored.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TransactionError> {
        if json.is_null() {
            return Err(TransactionError::InvalidJson(
                "input data is required".to_string(),
            ));
        }
        let parsed = InputJson::deserialize(json)
            .map_err(|e| TransactionError::InvalidJson(e.to_string()))?;
        let coin = parsed.coin.map(Coin::try_from).transpose()?;
        Ok(MutableInput {
            prevout: parsed.prevout,
            script: parsed.script,
            witness: parsed.witness,
            sequence: parsed.sequence,
            coin,
        }
        .finalize())
    }

    /// Parse the JSON form from text.
    pub fn from_json_str(text: &str) -> Result<Self, TransactionError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Thaw into a builder, dropping cached values.
    pub fn into_mutable(self) -> MutableInput {
        MutableInput {
            prevout: self.prevout,
            script: self.script,
            witness: self.witness,
            sequence: self.sequence,
            coin: self.coin,
        }
    }
}

fn expect_consumed(reader: &BtcReader) -> Result<(), TransactionError> {
    match reader.remaining() {
        0 => Ok(()),
        n => Err(TransactionError::SerializationError(format!(
            "{} trailing bytes after input",
            n
        ))),
    }
}

impl SpendingInput for Input {
    fn prevout(&self) -> &Outpoint {
        &self.prevout
    }

    fn script(&self) -> &Script {
        &self.script
    }

    fn witness(&self) -> &Witness {
        &self.witness
    }

    fn coin(&self) -> Option<&Coin> {
        self.coin.as_ref()
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn guessed_type(&self) -> ScriptType {
        *self.cached_type.get_or_init(|| {
            let kind = guess_type(&self.witness, &self.script);
            trace!(prevout = %self.prevout, kind = %kind, "cached input type");
            kind
        })
    }

    fn guessed_address(&self) -> Option<Address> {
        self.cached_address
            .get_or_init(|| guess_address(&self.witness, &self.script))
            .clone()
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.prevout == other.prevout
            && self.script == other.script
            && self.witness == other.witness
            && self.sequence == other.sequence
            && self.coin == other.coin
    }
}

impl Eq for Input {}

impl From<Input> for MutableInput {
    fn from(input: Input) -> Self {
        input.into_mutable()
    }
}

impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Diagnostic view of an input. Not for accounting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputInspection {
    /// Resolved type.
    #[serde(rename = "type")]
    pub kind: ScriptType,
    /// Type of the redeem script.
    pub subtype: Option<ScriptType>,
    /// Resolved address, mainnet form.
    pub address: Option<String>,
    /// Coin value in BTC text; `"0.0"` without a coin.
    pub value: String,
    /// Signature script.
    pub script: Script,
    /// Witness stack.
    pub witness: Witness,
    /// Resolved redeem script.
    pub redeem: Option<Script>,
    /// Sequence number.
    pub sequence: u32,
    /// The output being spent.
    pub prevout: Outpoint,
    /// The coin, or a placeholder of the same shape.
    pub coin: InspectedCoin,
}

/// The coin shown by [`SpendingInput::inspect`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InspectedCoin {
    /// The attached coin.
    Known(CoinJson),
    /// Stand-in when no coin is attached.
    Placeholder(PlaceholderCoin),
}

/// Coin-shaped record standing in for an unknown coin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaceholderCoin {
    #[serde(rename = "type")]
    pub kind: ScriptType,
    pub version: u32,
    pub height: i32,
    pub value: String,
    pub script: Script,
    pub coinbase: bool,
    pub hash: Hash,
    pub index: u32,
    pub age: u32,
    pub address: Option<String>,
}

impl PlaceholderCoin {
    fn for_prevout(prevout: &Outpoint) -> Self {
        PlaceholderCoin {
            kind: ScriptType::Unknown,
            version: 1,
            height: MEMPOOL_HEIGHT,
            value: to_btc(0),
            script: Script::new(),
            coinbase: false,
            hash: prevout.hash,
            index: prevout.index,
            age: 0,
            address: None,
        }
    }
}
