use rpc_core::GeoIp;

use crate::database::queries::CoinQueries;
use crate::error::Result;
use crate::models::Paginated;
use crate::query::types::{StatusJson, SummaryJson, TxJson};
use crate::query::QueryEngine;

/// Blocks sampled for the hashrate estimate.
const HASHRATE_LOOKUP: u32 = 120;

impl QueryEngine {
    pub async fn get_summary(&self) -> Result<SummaryJson> {
        let tip = self.client().get_tip().await?;
        let entry = self.client().get_entry(tip.height).await?;
        let mempool = self.client().get_mempool_info().await?;
        let registered_names = CoinQueries::registered_names(self.pool()).await?;

        let (chain_work, difficulty) = entry
            .map(|e| (e.chainwork.clone(), e.difficulty()))
            .unwrap_or_default();

        Ok(SummaryJson {
            network: self.params().network.as_str().to_string(),
            chain_work,
            difficulty,
            hashrate: self.hashrate().await?,
            unconfirmed: mempool.size,
            unconfirmed_size: mempool.bytes,
            registered_names,
        })
    }

    pub async fn get_status(&self) -> Result<StatusJson> {
        let info = self.client().get_node_info().await?;
        let tip = self.client().get_tip().await?;
        let difficulty = self
            .client()
            .get_entry(tip.height)
            .await?
            .map(|e| e.difficulty())
            .unwrap_or_default();

        Ok(StatusJson {
            host: self.listen.host.clone(),
            port: self.listen.port,
            key: self.listen.auth,
            network: info.network,
            progress: info.progress,
            version: info.version,
            agent: info.agent,
            connections: info.connections,
            height: info.height,
            difficulty,
            uptime: info.uptime,
            total_bytes_recv: info.total_bytes_recv,
            total_bytes_sent: info.total_bytes_sent,
        })
    }

    /// Chainwork delta per second over the trailing window.
    pub async fn hashrate(&self) -> Result<f64> {
        let tip = self.client().get_tip().await?;
        if tip.height == 0 {
            return Ok(0.0);
        }

        let start = tip.height.saturating_sub(HASHRATE_LOOKUP);
        let (Some(newest), Some(oldest)) = (
            self.client().get_entry(tip.height).await?,
            self.client().get_entry(start).await?,
        ) else {
            return Ok(0.0);
        };

        let elapsed = newest.time.saturating_sub(oldest.time);
        if elapsed == 0 {
            return Ok(0.0);
        }

        Ok((newest.chainwork_f64() - oldest.chainwork_f64()) / elapsed as f64)
    }

    pub async fn get_mempool_page(&self, offset: i64, limit: i64) -> Result<Paginated<TxJson>> {
        let txids = self.client().get_mempool_txids().await?;
        let total = txids.len() as i64;

        let mut result = Vec::new();
        for txid in txids
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
        {
            if let Some(json) = self.get_transaction(txid).await? {
                result.push(json);
            }
        }

        Ok(Paginated::new(total, limit, offset, result))
    }

    pub async fn get_peers(&self, offset: i64, limit: i64) -> Result<Paginated<rpc_core::PeerInfo>> {
        let peers = self.client().get_peers().await?;
        let total = peers.len() as i64;

        let result = peers
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok(Paginated::new(total, limit, offset, result))
    }

    pub async fn get_peers_location(&self) -> Result<Vec<GeoIp>> {
        Ok(self.client().get_peers_location().await?)
    }

    pub async fn tip_height(&self) -> Result<u32> {
        Ok(self.client().get_tip().await?.height)
    }
}
