use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::covenant::Covenant;
use crate::hash::Hash;

/// Reference to a transaction output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outpoint {
    pub hash: Hash,
    pub index: u32,
}

impl Outpoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The null outpoint marks coinbase and airdrop inputs.
    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == u32::MAX
    }

    pub fn null() -> Self {
        Self {
            hash: Hash::default(),
            index: u32::MAX,
        }
    }
}

impl Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.hash, self.index)
    }
}

/// A Handshake address: witness version plus program hash. The explorer keys
/// everything on the program hash in lowercase hex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub version: u8,
    pub hash: String,
}

impl Address {
    pub fn new(version: u8, hash: impl Into<String>) -> Self {
        Self {
            version,
            hash: hash.into(),
        }
    }

    pub fn hash_hex(&self) -> &str {
        &self.hash
    }

    /// Cheap syntactic check for a bech32 address string (`hs1…`, `ts1…`,
    /// `rs1…`). Used by search routing; the node remains the authority.
    pub fn looks_like_string(s: &str, hrp: &str) -> bool {
        let Some(rest) = s.strip_prefix(hrp).and_then(|r| r.strip_prefix('1')) else {
            return false;
        };
        const CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
        rest.len() >= 6 && rest.chars().all(|c| CHARSET.contains(c))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub prevout: Outpoint,
    #[serde(default)]
    pub witness: Vec<String>,
    pub sequence: u32,
}

impl Input {
    pub fn new(prevout: Outpoint, sequence: u32) -> Self {
        Self {
            prevout,
            witness: Vec::new(),
            sequence,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub value: u64,
    pub address: Address,
    pub covenant: Covenant,
}

impl Output {
    pub fn new(value: u64, address: Address, covenant: Covenant) -> Self {
        Self {
            value,
            address,
            covenant,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: Hash,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub locktime: u32,
}

impl Transaction {
    pub fn txid(&self) -> Hash {
        self.hash
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs
            .first()
            .map(|input| input.prevout.is_null())
            .unwrap_or(false)
    }

    pub fn output_value(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covenant::Covenant;

    #[test]
    fn coinbase_detection() {
        let coinbase = Transaction {
            hash: Hash::new([1; 32]),
            inputs: vec![Input::new(Outpoint::null(), u32::MAX)],
            outputs: vec![Output::new(
                2_000 * crate::COIN,
                Address::new(0, "aa".repeat(20)),
                Covenant::none(),
            )],
            locktime: 0,
        };
        assert!(coinbase.is_coinbase());

        let spend = Transaction {
            hash: Hash::new([2; 32]),
            inputs: vec![Input::new(Outpoint::new(Hash::new([1; 32]), 0), u32::MAX)],
            outputs: vec![],
            locktime: 0,
        };
        assert!(!spend.is_coinbase());
    }

    #[test]
    fn address_string_shape() {
        assert!(Address::looks_like_string("hs1qaxpy24lcpnravmvwjzq2v5hzrlxlcsequdu8a5", "hs"));
        assert!(!Address::looks_like_string("hs2qaxpy24", "hs"));
        assert!(!Address::looks_like_string("deadbeef", "hs"));
        assert!(!Address::looks_like_string("hs1qOOPS", "hs"));
    }
}
