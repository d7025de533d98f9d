//! Chain client trait: the full contract the explorer needs from the node.

use async_trait::async_trait;
use tokio::sync::broadcast;

use chain_core::{Block, ChainEntry, Hash};

use crate::model::*;

/// Read-only adapter over the upstream full node. Implementations are
/// stateless forwarders; all methods may fail transiently.
#[async_trait]
pub trait ChainApi: Send + Sync {
    // Chain
    async fn get_tip(&self) -> Result<ChainTip, RpcError>;
    async fn get_entry(&self, height: u32) -> Result<Option<ChainEntry>, RpcError>;
    async fn get_entry_by_hash(&self, hash: Hash) -> Result<Option<ChainEntry>, RpcError>;
    async fn get_next_hash(&self, hash: Hash) -> Result<Option<Hash>, RpcError>;
    async fn get_block(&self, height: u32) -> Result<Option<Block>, RpcError>;
    async fn get_block_by_hash(&self, hash: Hash) -> Result<Option<Block>, RpcError>;
    async fn get_block_view(&self, block: &Block) -> Result<CoinView, RpcError>;
    async fn get_median_time(&self, entry: &ChainEntry) -> Result<u64, RpcError>;

    // Names
    async fn get_name_state(&self, name_hash: Hash) -> Result<Option<NameState>, RpcError>;

    // Transactions
    async fn get_tx_meta(&self, txid: Hash) -> Result<Option<TxMeta>, RpcError>;
    async fn get_meta_view(&self, meta: &TxMeta) -> Result<CoinView, RpcError>;

    // Node / mempool / pool
    async fn get_node_info(&self) -> Result<NodeInfo, RpcError>;
    async fn get_mempool_info(&self) -> Result<MempoolInfo, RpcError>;
    async fn get_mempool_txids(&self) -> Result<Vec<Hash>, RpcError>;
    async fn get_mempool_by_address(&self, address_hash: &str) -> Result<Vec<Hash>, RpcError>;
    async fn get_peers(&self) -> Result<Vec<PeerInfo>, RpcError>;
    async fn get_peers_location(&self) -> Result<Vec<GeoIp>, RpcError>;

    /// Subscribe to the node's event stream. Receivers may observe lag; the
    /// indexer recovers by scanning forward from its own head.
    fn subscribe(&self) -> broadcast::Receiver<ChainEvent>;
}
