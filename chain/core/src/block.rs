use serde::{Deserialize, Serialize};

use crate::hash::Hash;
use crate::tx::Transaction;

/// Block header as served by the upstream node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub hash: Hash,
    pub version: u32,
    pub prev_block: Hash,
    pub merkle_root: Hash,
    pub tree_root: Hash,
    pub time: u64,
    pub bits: u32,
    pub nonce: u64,
}

/// Complete block: header plus transactions in consensus order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, txs: Vec<Transaction>) -> Self {
        Self { header, txs }
    }

    pub fn coinbase(&self) -> Option<&Transaction> {
        self.txs.first().filter(|tx| tx.is_coinbase())
    }
}

/// Chain-index entry for a block: header fields plus cumulative work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    pub height: u32,
    pub hash: Hash,
    pub prev_block: Hash,
    pub merkle_root: Hash,
    pub time: u64,
    pub bits: u32,
    /// Cumulative proof of work, 32-byte big-endian hex.
    pub chainwork: String,
}

impl ChainEntry {
    pub fn difficulty(&self) -> f64 {
        bits_to_difficulty(self.bits)
    }

    /// Chainwork as a float, precise enough for hashrate deltas.
    pub fn chainwork_f64(&self) -> f64 {
        let Ok(bytes) = hex::decode(&self.chainwork) else {
            return 0.0;
        };
        bytes.iter().fold(0.0, |acc, &b| acc * 256.0 + f64::from(b))
    }
}

/// Difficulty relative to the maximum target, from the compact bits encoding.
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let exponent = (bits >> 24) & 0xff;
    let mantissa = bits & 0x00ff_ffff;
    if mantissa == 0 {
        return 0.0;
    }
    let target = f64::from(mantissa) * 256f64.powi(exponent as i32 - 3);
    if target == 0.0 {
        return 0.0;
    }
    // max target: 0xffff * 256^26
    65_535.0 * 256f64.powi(26) / target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_one_at_max_target() {
        let diff = bits_to_difficulty(0x1d00_ffff);
        assert!((diff - 1.0).abs() < 1e-9);
    }

    #[test]
    fn difficulty_grows_as_target_shrinks() {
        assert!(bits_to_difficulty(0x1c00_ffff) > bits_to_difficulty(0x1d00_ffff));
        assert_eq!(bits_to_difficulty(0x1d00_0000), 0.0);
    }

    #[test]
    fn chainwork_parses_as_float() {
        let entry = ChainEntry {
            height: 1,
            hash: Hash::new([1; 32]),
            prev_block: Hash::new([0; 32]),
            merkle_root: Hash::new([0; 32]),
            time: 0,
            bits: 0x1d00_ffff,
            chainwork: format!("{:064x}", 0x10000u64),
        };
        assert_eq!(entry.chainwork_f64(), 65_536.0);
    }
}
