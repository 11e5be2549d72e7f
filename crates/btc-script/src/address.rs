/// Bitcoin address handling.
///
/// Addresses pair a hash with the kind of output it commits to. The text
/// form is Base58Check over `prefix ++ [version, 0x00] ++ hash`, where the
/// version and padding bytes are only present for witness kinds.

use std::fmt;
use std::str::FromStr;

use btc_primitives::base58;
use btc_primitives::hash::{hash160, sha256};

use crate::ScriptError;

/// Bitcoin network selecting the address prefix table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    /// Bitcoin mainnet.
    #[default]
    Mainnet,
    /// Bitcoin testnet.
    Testnet,
}

impl Network {
    /// All supported networks, in prefix lookup order.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Base58Check prefix bytes for every address kind on this network.
    pub fn prefixes(&self) -> [(AddressType, u8); 4] {
        match self {
            Network::Mainnet => [
                (AddressType::Pubkeyhash, 0x00),
                (AddressType::Scripthash, 0x05),
                (AddressType::WitnessPubkeyhash, 0x06),
                (AddressType::WitnessScripthash, 0x0a),
            ],
            Network::Testnet => [
                (AddressType::Pubkeyhash, 0x6f),
                (AddressType::Scripthash, 0xc4),
                (AddressType::WitnessPubkeyhash, 0x03),
                (AddressType::WitnessScripthash, 0x28),
            ],
        }
    }

    /// The Base58Check prefix byte for an address kind on this network.
    pub fn prefix(&self, kind: AddressType) -> u8 {
        self.prefixes()
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0x00, |(_, prefix)| *prefix)
    }

    /// Find the network and address kind a prefix byte belongs to.
    pub fn from_prefix(prefix: u8) -> Option<(Network, AddressType)> {
        Network::ALL.iter().find_map(|network| {
            network
                .prefixes()
                .iter()
                .find(|(_, p)| *p == prefix)
                .map(|(kind, _)| (*network, *kind))
        })
    }
}

/// The kind of output an address commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Hash160 of a public key.
    Pubkeyhash,
    /// Hash160 of a redeem script.
    Scripthash,
    /// Hash160 of a public key, spent through the witness.
    WitnessPubkeyhash,
    /// SHA-256 of a witness script.
    WitnessScripthash,
}

impl AddressType {
    /// Every address kind.
    pub const ALL: [AddressType; 4] = [
        AddressType::Pubkeyhash,
        AddressType::Scripthash,
        AddressType::WitnessPubkeyhash,
        AddressType::WitnessScripthash,
    ];

    /// Expected hash length in bytes.
    pub fn hash_size(&self) -> usize {
        match self {
            AddressType::WitnessScripthash => 32,
            _ => 20,
        }
    }

    /// Whether the text form carries a witness version.
    pub fn is_witness(&self) -> bool {
        matches!(
            self,
            AddressType::WitnessPubkeyhash | AddressType::WitnessScripthash
        )
    }
}

/// A typed address hash on a particular network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    /// What the hash commits to.
    pub kind: AddressType,
    /// The committed hash (20 or 32 bytes depending on `kind`).
    pub hash: Vec<u8>,
    /// The network used for the text form.
    pub network: Network,
}

impl Address {
    /// Create a mainnet address from a kind and hash.
    pub fn new(kind: AddressType, hash: Vec<u8>) -> Self {
        Address {
            kind,
            hash,
            network: Network::Mainnet,
        }
    }

    /// Pay-to-public-key-hash address for a serialized public key.
    pub fn from_public_key(key: &[u8]) -> Self {
        Self::new(AddressType::Pubkeyhash, hash160(key).to_vec())
    }

    /// Pay-to-script-hash address for a serialized redeem script.
    pub fn from_redeem_script(script: &[u8]) -> Self {
        Self::new(AddressType::Scripthash, hash160(script).to_vec())
    }

    /// Witness key-hash address for a serialized public key.
    pub fn from_witness_public_key(key: &[u8]) -> Self {
        Self::new(AddressType::WitnessPubkeyhash, hash160(key).to_vec())
    }

    /// Witness script-hash address for a serialized witness script.
    pub fn from_witness_script(script: &[u8]) -> Self {
        Self::new(AddressType::WitnessScripthash, sha256(script).to_vec())
    }

    /// Return the same address rendered for another network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Parse a Base58Check address string.
    ///
    /// The prefix byte selects both the network and the address kind; the
    /// payload length must match the kind.
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    ///
    /// # Returns
    /// An `Address` or an error if the string is invalid.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(addr)
            .map_err(|e| ScriptError::InvalidAddress(format!("{}: {}", addr, e)))?;

        let (prefix, body) = payload
            .split_first()
            .ok_or_else(|| ScriptError::InvalidAddressLength(addr.to_string()))?;

        let (network, kind) = Network::from_prefix(*prefix)
            .ok_or_else(|| ScriptError::UnsupportedAddress(addr.to_string()))?;

        let hash = if kind.is_witness() {
            match body {
                [0x00, 0x00, hash @ ..] => hash,
                _ => return Err(ScriptError::InvalidAddress(addr.to_string())),
            }
        } else {
            body
        };

        if hash.len() != kind.hash_size() {
            return Err(ScriptError::InvalidAddressLength(addr.to_string()));
        }

        Ok(Address {
            kind,
            hash: hash.to_vec(),
            network,
        })
    }

    /// Encode as a Base58Check string for this address's network.
    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(3 + self.hash.len());
        payload.push(self.network.prefix(self.kind));
        if self.kind.is_witness() {
            payload.push(0x00);
            payload.push(0x00);
        }
        payload.extend_from_slice(&self.hash);
        base58::check_encode(&payload)
    }

    /// The raw committed hash.
    pub fn get_hash(&self) -> &[u8] {
        &self.hash
    }

    /// The committed hash as lowercase hex.
    pub fn get_hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_string(&s).map_err(serde::de::Error::custom)
    }
}
