use chain_core::Hash;

use crate::error::Result;
use crate::models::Paginated;
use crate::query::types::{BlockJson, PoolRef, TxJson};
use crate::query::QueryEngine;

impl QueryEngine {
    /// Assemble a block from live node data: entry, median time, next hash,
    /// subsidy and fee math, pool attribution.
    pub async fn get_block(&self, height: u32, details: bool) -> Result<Option<BlockJson>> {
        let Some(entry) = self.client().get_entry(height).await? else {
            return Ok(None);
        };
        let Some(block) = self.client().get_block(height).await? else {
            return Ok(None);
        };

        let median_time = self.client().get_median_time(&entry).await?;
        let next_hash = self.client().get_next_hash(entry.hash).await?;

        let reward = self.params().reward(height);
        let coinbase_value = block.coinbase().map(|tx| tx.output_value()).unwrap_or(0);
        let fees = coinbase_value.saturating_sub(reward);
        let tx_count = block.txs.len();
        let average_fee = if tx_count > 0 {
            fees as f64 / tx_count as f64
        } else {
            0.0
        };

        let miner_address = block
            .coinbase()
            .and_then(|cb| cb.outputs.first())
            .map(|o| o.address.hash.clone());
        let pool = miner_address
            .as_deref()
            .and_then(|addr| self.pools.attribute(addr))
            .map(|(name, entry)| PoolRef {
                name: name.to_string(),
                url: entry.url.clone(),
            });
        let miner = pool
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let (txs, coinbase_witness) = if details {
            let mut txs: Vec<TxJson> = Vec::with_capacity(tx_count);
            for tx in &block.txs {
                if let Some(json) = self.get_transaction(tx.hash).await? {
                    txs.push(json);
                }
            }
            let witness = block
                .coinbase()
                .and_then(|cb| cb.inputs.first())
                .map(|input| input.witness.clone());
            (Some(txs), witness)
        } else {
            (None, None)
        };

        Ok(Some(BlockJson {
            height,
            hash: entry.hash.to_hex(),
            prev_block: entry.prev_block.to_hex(),
            time: entry.time,
            median_time,
            next_hash: next_hash.map(|h| h.to_hex()),
            difficulty: entry.difficulty(),
            miner,
            miner_address,
            pool,
            reward,
            fees,
            average_fee,
            tx_count,
            txs,
            coinbase_witness,
        }))
    }

    /// Latest blocks; `offset` counts back from the tip.
    pub async fn get_blocks(&self, limit: i64, offset: i64) -> Result<Paginated<BlockJson>> {
        let tip = self.client().get_tip().await?;
        let total = i64::from(tip.height) + 1;

        let mut result = Vec::new();
        let start = i64::from(tip.height) - offset;
        let mut height = start;
        while height >= 0 && result.len() < limit as usize {
            if let Some(block) = self.get_block(height as u32, false).await? {
                result.push(block);
            }
            height -= 1;
        }

        Ok(Paginated::new(total, limit, offset, result))
    }

    pub async fn get_block_by_hash(&self, hash: Hash) -> Result<Option<BlockJson>> {
        let Some(entry) = self.client().get_entry_by_hash(hash).await? else {
            return Ok(None);
        };
        self.get_block(entry.height, true).await
    }
}
