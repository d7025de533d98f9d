use chain_core::{CovenantType, Hash};
use rpc_core::{CoinView, TxMeta};

use crate::database::queries::TxQueries;
use crate::error::Result;
use crate::models::Paginated;
use crate::query::types::{TxInputJson, TxJson, TxOutputJson};
use crate::query::QueryEngine;

impl QueryEngine {
    pub async fn get_transaction(&self, txid: Hash) -> Result<Option<TxJson>> {
        let Some(meta) = self.client().get_tx_meta(txid).await? else {
            return Ok(None);
        };
        let view = self.client().get_meta_view(&meta).await?;
        let json = self.normalize_tx(&meta, &view).await?;
        Ok(Some(json))
    }

    async fn normalize_tx(&self, meta: &TxMeta, view: &CoinView) -> Result<TxJson> {
        let tx = &meta.tx;
        let coinbase = tx.is_coinbase();

        let mut inputs = Vec::with_capacity(tx.inputs.len());
        for (i, input) in tx.inputs.iter().enumerate() {
            let json = if input.prevout.is_null() {
                if coinbase && i == 0 {
                    TxInputJson {
                        value: Some(self.params().reward(meta.height.max(0) as u32)),
                        coinbase: true,
                        ..Default::default()
                    }
                } else {
                    TxInputJson {
                        airdrop: true,
                        ..Default::default()
                    }
                }
            } else if let Some(coin) = view.get(&input.prevout) {
                TxInputJson {
                    value: Some(coin.value),
                    address: Some(coin.address.hash.clone()),
                    ..Default::default()
                }
            } else {
                TxInputJson::default()
            };
            inputs.push(json);
        }

        let mut outputs = Vec::with_capacity(tx.outputs.len());
        for output in &tx.outputs {
            let covenant = &output.covenant;
            let action = covenant.covenant_type.as_str().to_string();
            let mut json = TxOutputJson {
                action,
                address: output.address.hash.clone(),
                value: None,
                name: None,
                name_hash: None,
                nonce: None,
            };

            match covenant.covenant_type {
                CovenantType::None => json.value = Some(output.value),
                CovenantType::Open | CovenantType::Claim => json.name = covenant.name(),
                CovenantType::Bid => {
                    json.name = covenant.name();
                    json.value = Some(output.value);
                }
                CovenantType::Reveal => {
                    json.nonce = covenant.nonce().map(str::to_string);
                    json.value = Some(output.value);
                }
                CovenantType::Redeem => {}
                _ => json.value = Some(output.value),
            }

            if covenant.is_name() {
                let name_hash = covenant.name_hash().map(str::to_string);
                if json.name.is_none() {
                    if let Some(hash) = name_hash.as_deref().and_then(|h| Hash::from_hex(h).ok())
                    {
                        json.name = self
                            .client()
                            .get_name_state(hash)
                            .await?
                            .map(|state| state.name);
                    }
                }
                json.name_hash = name_hash;
            }

            outputs.push(json);
        }

        Ok(TxJson {
            txid: tx.hash.to_hex(),
            height: meta.height,
            block_hash: meta.block_hash.map(|h| h.to_hex()),
            time: meta.time,
            inputs,
            outputs,
        })
    }

    /// Latest transactions: walk the chain backwards from the tip, flattening
    /// each block, until `limit` collected.
    pub async fn get_transactions(&self, limit: usize) -> Result<Vec<TxJson>> {
        let tip = self.client().get_tip().await?;
        let mut collected = Vec::with_capacity(limit);

        let mut height = i64::from(tip.height);
        while height >= 0 && collected.len() < limit {
            if let Some(block) = self.client().get_block(height as u32).await? {
                for tx in &block.txs {
                    if collected.len() >= limit {
                        break;
                    }
                    if let Some(json) = self.get_transaction(tx.hash).await? {
                        collected.push(json);
                    }
                }
            }
            height -= 1;
        }

        Ok(collected)
    }

    pub async fn get_transactions_by_height(
        &self,
        height: u32,
        offset: i64,
        limit: i64,
    ) -> Result<Paginated<TxJson>> {
        let Some(block) = self.client().get_block(height).await? else {
            return Ok(Paginated::new(0, limit, offset, Vec::new()));
        };
        let total = block.txs.len() as i64;

        let mut result = Vec::new();
        for tx in block
            .txs
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
        {
            if let Some(json) = self.get_transaction(tx.hash).await? {
                result.push(json);
            }
        }

        Ok(Paginated::new(total, limit, offset, result))
    }

    pub async fn get_transactions_by_address(
        &self,
        address: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Paginated<TxJson>> {
        let rows = TxQueries::page_by_address(self.pool(), address, limit, offset).await?;
        let total = TxQueries::count_by_address(self.pool(), address).await?;

        let mut result = Vec::new();
        for row in rows {
            let Ok(txid) = Hash::from_hex(&row.txid) else {
                continue;
            };
            if let Some(json) = self.get_transaction(txid).await? {
                result.push(json);
            }
        }

        Ok(Paginated::new(total, limit, offset, result))
    }
}
