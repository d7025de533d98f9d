//! Indexer service: keeps the secondary store consistent with the canonical
//! chain via catch-up scans, connect events and reorg rollback.

use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::atomic::AtomicI64;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use chain_core::{Block, ChainEntry};
use rpc_core::{ChainApi, ChainEvent, ChainTip, CoinView};

use crate::config::PoolTable;
use crate::database::queries::BlockQueries;
use crate::database::Database;
use crate::error::Result;
use crate::indexer::{block_indexer, rollback};

pub struct IndexerService {
    db: Arc<Database>,
    client: Arc<dyn ChainApi>,
    pools: Arc<PoolTable>,
    /// Serializes scans, block application and rollback. Readers never take it.
    gate: Mutex<()>,
    /// Set when chain activity arrives while the gate is held; the holder
    /// drains it by re-scanning.
    pending: AtomicBool,
    /// Highest indexed height; -1 when the store is empty.
    head: AtomicI64,
}

impl IndexerService {
    pub async fn new(
        db: Arc<Database>,
        client: Arc<dyn ChainApi>,
        pools: Arc<PoolTable>,
    ) -> Result<Arc<Self>> {
        let head = BlockQueries::max_height(db.pool()).await?.unwrap_or(-1);
        info!(head, "indexer starting");

        Ok(Arc::new(Self {
            db,
            client,
            pools,
            gate: Mutex::new(()),
            pending: AtomicBool::new(false),
            head: AtomicI64::new(head),
        }))
    }

    pub fn head(&self) -> i64 {
        self.head.load(SeqCst)
    }

    /// Consume the node event stream forever. Run on its own task.
    pub async fn start(self: Arc<Self>) {
        let mut events = self.client.subscribe();
        self.sync().await;

        loop {
            match events.recv().await {
                Ok(ChainEvent::Connect) => self.sync().await,
                Ok(ChainEvent::BlockConnect { entry, block, view }) => {
                    self.connect_block(&entry, &block, &view).await;
                }
                Ok(ChainEvent::ChainReset { tip }) => self.reset(tip).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "chain events dropped, falling back to scan");
                    self.sync().await;
                }
                Err(RecvError::Closed) => {
                    warn!("chain event stream closed");
                    break;
                }
            }
        }
    }

    /// Catch up to the node tip. Safe to call from anywhere: if an indexing
    /// operation is already running this only flags it, and the running
    /// operation re-scans before releasing the gate. After any quiescent
    /// period the head equals the tip at the last consumed event.
    pub async fn sync(&self) {
        self.pending.store(true, SeqCst);
        let Ok(_guard) = self.gate.try_lock() else {
            return;
        };

        while self.pending.swap(false, SeqCst) {
            if let Err(e) = self.scan().await {
                error!("catch-up scan failed: {e}");
                break;
            }
        }
    }

    /// Steady state: apply the delivered block directly when it extends the
    /// head, otherwise degrade to a scan.
    async fn connect_block(&self, entry: &ChainEntry, block: &Block, view: &CoinView) {
        {
            let Ok(_guard) = self.gate.try_lock() else {
                self.pending.store(true, SeqCst);
                return;
            };

            let height = i64::from(entry.height);
            let head = self.head();
            if height <= head {
                warn!(height, head, "stale block event");
            } else if height == head + 1 {
                if let Err(e) = self.apply(entry, block, view).await {
                    error!(height, "failed to index block: {e}");
                    self.pending.store(true, SeqCst);
                }
            } else {
                // gap: the node is ahead of us, scan forward instead
                self.pending.store(true, SeqCst);
            }
        }

        if self.pending.load(SeqCst) {
            self.sync().await;
        }
    }

    async fn scan(&self) -> Result<()> {
        let tip = self.client.get_tip().await?;
        let target = i64::from(tip.height);

        while self.head() < target {
            let height = (self.head() + 1) as u32;
            let Some(entry) = self.client.get_entry(height).await? else {
                break;
            };
            let Some(block) = self.client.get_block(height).await? else {
                break;
            };
            let view = self.client.get_block_view(&block).await?;
            self.apply(&entry, &block, &view).await?;
        }

        Ok(())
    }

    async fn apply(&self, entry: &ChainEntry, block: &Block, view: &CoinView) -> Result<()> {
        let mut dbtx = self.db.pool().begin().await?;
        block_indexer::apply_block(&mut dbtx, &self.pools, entry, block, view).await?;
        dbtx.commit().await?;

        self.head.store(i64::from(entry.height), SeqCst);
        info!(height = entry.height, txs = block.txs.len(), "indexed block");
        Ok(())
    }

    /// Reorg: roll the store back to `tip`, then scan the new fork.
    pub async fn reset(&self, tip: ChainTip) {
        {
            let _guard = self.gate.lock().await;
            match rollback::rollback(self.db.pool(), i64::from(tip.height)).await {
                Ok(()) => self.head.store(i64::from(tip.height), SeqCst),
                Err(e) => {
                    error!(height = tip.height, "rollback failed: {e}");
                    return;
                }
            }
        }

        self.sync().await;
    }
}
