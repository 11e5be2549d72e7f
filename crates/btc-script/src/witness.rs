//! Segregated witness stacks.
//!
//! A [`Witness`] is an ordered list of byte items. It is classified with the
//! same item patterns as a signature script, reported as witness types.

use btc_primitives::util::{BtcReader, BtcWriter, VarInt};

use crate::address::Address;
use crate::classify::{self, ScriptType};
use crate::script::Script;
use crate::ScriptError;

/// A witness stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Witness {
    items: Vec<Vec<u8>>,
}

impl Witness {
    /// Create an empty witness.
    pub fn new() -> Self {
        Witness { items: Vec::new() }
    }

    /// Create a witness from its stack items, bottom first.
    pub fn from_items(items: Vec<Vec<u8>>) -> Self {
        Witness { items }
    }

    /// The stack items, bottom first.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// Number of stack items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push an item on top of the stack.
    pub fn push(&mut self, item: Vec<u8>) {
        self.items.push(item);
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Read a witness from the cursor: item count, then each item
    /// length-prefixed.
    pub fn read_from(reader: &mut BtcReader) -> Result<Self, ScriptError> {
        let count = reader.read_varint()?.value();
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(reader.read_var_bytes()?.to_vec());
        }
        Ok(Witness { items })
    }

    /// Append the serialized witness to the writer.
    pub fn write_to(&self, writer: &mut BtcWriter) {
        writer.write_varint(VarInt(self.items.len() as u64));
        for item in &self.items {
            writer.write_var_bytes(item);
        }
    }

    /// Serialize the witness to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BtcWriter::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.items.iter().fold(VarInt(self.items.len() as u64).length(), |acc, item| {
            acc + VarInt(item.len() as u64).length() + item.len()
        })
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Guess the type of output this witness spends.
    pub fn get_input_type(&self) -> ScriptType {
        match classify::input_type(&self.items) {
            ScriptType::Pubkeyhash => ScriptType::WitnessPubkeyhash,
            ScriptType::Scripthash => ScriptType::WitnessScripthash,
            _ => ScriptType::Unknown,
        }
    }

    /// Guess the address this witness spends from.
    pub fn get_input_address(&self) -> Option<Address> {
        match self.get_input_type() {
            ScriptType::WitnessPubkeyhash => Some(Address::from_witness_public_key(&self.items[1])),
            ScriptType::WitnessScripthash => {
                Some(Address::from_witness_script(self.items.last()?))
            }
            _ => None,
        }
    }

    /// Whether the top item looks like a serialized witness script.
    pub fn is_scripthash_input(&self) -> bool {
        classify::is_scripthash_input(&self.items)
    }

    /// The top stack item, read as a script.
    pub fn get_redeem(&self) -> Option<Script> {
        self.items.last().map(|item| Script::from_bytes(item))
    }
}

impl serde::Serialize for Witness {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(&hex::encode(item))?;
        }
        seq.end()
    }
}

impl<'de> serde::Deserialize<'de> for Witness {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        let items = strings
            .iter()
            .map(hex::decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?;
        Ok(Witness { items })
    }
}
