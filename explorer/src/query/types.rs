//! Explorer response shapes. Field names are part of the public contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockJson {
    pub height: u32,
    pub hash: String,
    pub prev_block: String,
    pub time: u64,
    pub median_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hash: Option<String>,
    pub difficulty: f64,
    pub miner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miner_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolRef>,
    pub reward: u64,
    pub fees: u64,
    pub average_fee: f64,
    pub tx_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txs: Option<Vec<TxJson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase_witness: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInputJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub coinbase: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub airdrop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutputJson {
    pub action: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxJson {
    pub txid: String,
    /// -1 while unconfirmed.
    pub height: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    pub time: u64,
    pub inputs: Vec<TxInputJson>,
    pub outputs: Vec<TxOutputJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutpointJson {
    pub txid: String,
    pub index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidJson {
    pub txid: String,
    pub index: i64,
    /// Locked-up amount visible on chain; the true bid stays blinded until
    /// reveal.
    pub lockup: i64,
    pub time: i64,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<OutpointJson>,
    pub value: i64,
    pub win: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseJson {
    pub week: u32,
    pub start: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameInfoJson {
    pub name: String,
    pub name_hash: String,
    pub state: String,
    pub reserved: bool,
    pub release: ReleaseJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<u32>,
    pub value: u64,
    pub highest: u64,
    pub renewal: u32,
    pub renewals: u32,
    pub weak: bool,
    pub transfer: u32,
    pub revoked: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks_until: Option<u32>,
    pub next_state: String,
    pub bids: Vec<BidJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameListItem {
    pub name: String,
    pub name_hash: String,
    pub open: i64,
    pub value: i64,
    pub highest: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEventJson {
    pub action: String,
    pub txid: String,
    pub index: i64,
    pub height: i64,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalanceJson {
    pub hash: String,
    pub confirmed: i64,
    pub unconfirmed: i64,
    pub received: i64,
    pub spent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Milliseconds, chart-friendly.
    pub date: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolShare {
    pub pool_name: String,
    pub url: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDistributionJson {
    pub total: i64,
    pub items: Vec<PoolShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryJson {
    pub network: String,
    pub chain_work: String,
    pub difficulty: f64,
    pub hashrate: f64,
    pub unconfirmed: u64,
    pub unconfirmed_size: u64,
    pub registered_names: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusJson {
    pub host: String,
    pub port: u16,
    pub key: bool,
    pub network: String,
    pub progress: f64,
    pub version: String,
    pub agent: String,
    pub connections: u32,
    pub height: u32,
    pub difficulty: f64,
    pub uptime: u64,
    pub total_bytes_recv: u64,
    pub total_bytes_sent: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBidJson {
    pub name: String,
    pub name_hash: String,
    pub highest: i64,
}
