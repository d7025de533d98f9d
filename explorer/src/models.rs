//! Store row models and shared response envelopes.

use serde::{Deserialize, Serialize};

use chain_core::CovenantType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlockRow {
    pub height: i64,
    pub hash: String,
    pub difficulty: f64,
    pub time: i64,
    pub txs: i64,
    pub miner: String,
    pub miner_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TxRow {
    pub txid: String,
    pub height: i64,
    pub hash: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CoinRow {
    pub txid: String,
    pub idx: i64,
    pub height: i64,
    pub time: i64,
    pub address: String,
    pub value: i64,
    pub covenant_type: i64,
    pub covenant_items: String,
    pub name_hash: Option<String>,
    pub coinbase: bool,
    pub spent: bool,
    pub spent_txid: Option<String>,
    pub spent_index: Option<i64>,
}

impl CoinRow {
    pub fn covenant(&self) -> Option<CovenantType> {
        u8::try_from(self.covenant_type)
            .ok()
            .and_then(|v| CovenantType::from_u8(v).ok())
    }

    pub fn items(&self) -> Vec<String> {
        serde_json::from_str(&self.covenant_items).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NameRow {
    pub name_hash: String,
    pub name: String,
    pub open: i64,
    pub value: i64,
    pub highest: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub time: i64,
    pub blocks: i64,
    pub txs: i64,
    pub total_txs: i64,
    pub difficulty: f64,
    pub supply: f64,
    pub burned: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MinerCount {
    pub miner: String,
    pub count: i64,
}

/// Standard list envelope: `{total, limit, offset, result}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub result: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(total: i64, limit: i64, offset: i64, result: Vec<T>) -> Self {
        Self {
            total,
            limit,
            offset,
            result,
        }
    }
}
