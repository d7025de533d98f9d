//! Wire models served by the upstream node, plus the chain event stream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chain_core::{Address, Block, ChainEntry, Covenant, Hash, Outpoint, Transaction};

#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("node error {code}: {message}")]
    Node { code: i32, message: String },
}

/// Best chain tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTip {
    pub height: u32,
    pub hash: Hash,
}

/// A coin as resolved by the node's view of a block or transaction: enough to
/// attribute and value an input without consulting the chain database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCoin {
    pub value: u64,
    pub address: Address,
    pub covenant: Covenant,
    pub height: u32,
    pub coinbase: bool,
}

/// Resolved prevouts for a block or transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinView {
    /// Keyed by `"{txid}/{index}"`.
    pub coins: HashMap<String, ViewCoin>,
}

impl CoinView {
    pub fn key(outpoint: &Outpoint) -> String {
        format!("{}/{}", outpoint.hash, outpoint.index)
    }

    pub fn get(&self, outpoint: &Outpoint) -> Option<&ViewCoin> {
        self.coins.get(&Self::key(outpoint))
    }

    pub fn insert(&mut self, outpoint: Outpoint, coin: ViewCoin) {
        self.coins.insert(Self::key(&outpoint), coin);
    }
}

/// Consensus name state as reported by the node. The indexer never derives
/// this; it is the authority for lifecycle answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameState {
    pub name: String,
    pub name_hash: Hash,
    /// Upper-case lifecycle label: OPENING, BIDDING, REVEAL, CLOSED, LOCKED.
    pub state: String,
    /// Height of the most recent OPEN or CLAIM.
    pub height: u32,
    pub renewal: u32,
    #[serde(default)]
    pub renewals: u32,
    #[serde(default)]
    pub owner: Option<Outpoint>,
    pub value: u64,
    pub highest: u64,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub transfer: u32,
    #[serde(default)]
    pub revoked: u32,
    #[serde(default)]
    pub claimed: u32,
    #[serde(default)]
    pub weak: bool,
    #[serde(default)]
    pub expired: bool,
}

/// Confirmed (or mempool) transaction with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxMeta {
    pub tx: Transaction,
    /// -1 while unconfirmed.
    pub height: i64,
    #[serde(default)]
    pub block_hash: Option<Hash>,
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub version: String,
    pub agent: String,
    pub network: String,
    pub height: u32,
    pub progress: f64,
    pub connections: u32,
    pub uptime: u64,
    pub total_bytes_recv: u64,
    pub total_bytes_sent: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolInfo {
    pub size: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub addr: String,
    pub agent: String,
    pub version: u32,
    pub outbound: bool,
    #[serde(default)]
    pub uptime: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoIp {
    pub host: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
}

/// Events pushed by the node over the persistent socket.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    /// Socket (re)connected; the indexer should catch up.
    Connect,
    BlockConnect {
        entry: ChainEntry,
        block: Block,
        view: CoinView,
    },
    ChainReset {
        tip: ChainTip,
    },
}
