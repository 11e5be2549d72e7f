//! Snapshots of previously created outputs.
//!
//! A [`Coin`] is everything known about an output being spent: its script
//! and value, plus where and when it was created.

use btc_primitives::amount::{from_btc, to_btc};
use btc_primitives::chainhash::Hash;
use btc_script::{Address, Network, Script, ScriptType};
use serde::{Deserialize, Serialize, Serializer};

use crate::outpoint::Outpoint;
use crate::TransactionError;

/// Height recorded for coins not yet in a block.
pub const MEMPOOL_HEIGHT: i32 = -1;

/// A spendable output together with its origin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CoinJson")]
pub struct Coin {
    /// Version of the transaction that created the output.
    pub version: u32,
    /// Block height, or [`MEMPOOL_HEIGHT`] if unconfirmed.
    pub height: i32,
    /// Value in satoshis.
    pub value: u64,
    /// The output script.
    pub script: Script,
    /// Whether the creating transaction is a coinbase.
    pub coinbase: bool,
    /// Id of the creating transaction, internal order.
    pub hash: Hash,
    /// Output index within the creating transaction.
    pub index: u32,
}

/// JSON representation of a [`Coin`].
///
/// `value` is BTC text; `address` is informational and ignored on input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinJson {
    pub version: u32,
    pub height: i32,
    pub value: String,
    pub script: Script,
    pub coinbase: bool,
    pub hash: Hash,
    pub index: u32,
    #[serde(default)]
    pub address: Option<String>,
}

impl Coin {
    /// The outpoint this coin is spent through.
    pub fn outpoint(&self) -> Outpoint {
        Outpoint::new(self.hash, self.index)
    }

    /// Whether the coin is not yet confirmed.
    pub fn is_unconfirmed(&self) -> bool {
        self.height == MEMPOOL_HEIGHT
    }

    /// Classify the output script.
    pub fn get_type(&self) -> ScriptType {
        self.script.get_type()
    }

    /// The address the output script pays to.
    pub fn get_address(&self) -> Option<Address> {
        self.script.get_address()
    }

    /// JSON form with the address rendered for `network`.
    pub fn to_json_for(&self, network: Network) -> CoinJson {
        CoinJson {
            version: self.version,
            height: self.height,
            value: to_btc(self.value),
            script: self.script.clone(),
            coinbase: self.coinbase,
            hash: self.hash,
            index: self.index,
            address: self
                .get_address()
                .map(|a| a.with_network(network).to_base58()),
        }
    }

    /// JSON form with a mainnet address.
    pub fn to_json(&self) -> CoinJson {
        self.to_json_for(Network::Mainnet)
    }

    /// Parse the JSON form.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TransactionError> {
        let parsed = CoinJson::deserialize(json)
            .map_err(|e| TransactionError::InvalidJson(format!("coin: {}", e)))?;
        Coin::try_from(parsed)
    }
}

impl TryFrom<CoinJson> for Coin {
    type Error = TransactionError;

    fn try_from(json: CoinJson) -> Result<Self, Self::Error> {
        let value = from_btc(&json.value)
            .map_err(|e| TransactionError::InvalidJson(format!("coin value: {}", e)))?;
        Ok(Coin {
            version: json.version,
            height: json.height,
            value,
            script: json.script,
            coinbase: json.coinbase,
            hash: json.hash,
            index: json.index,
        })
    }
}

impl Serialize for Coin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
