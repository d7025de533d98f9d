//! Periodically refreshed aggregate views. Readers always get a complete
//! snapshot: refreshes build a new one off to the side and swap it in by
//! reference, so a read racing a refresh sees the previous snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;
use tracing::{error, info};

use rpc_core::ChainApi;

use crate::database::queries::{CoinQueries, NameQueries};
use crate::database::Database;
use crate::error::Result;
use crate::query::types::{NameListItem, TopBidJson};
use crate::query::{status_window, NameStatus};

const REFRESH_INTERVAL: Duration = Duration::from_secs(20 * 60);
const SETTLE_DELAY: Duration = Duration::from_secs(10);

const TOP_VALUE_LIMIT: i64 = 50;
const TOP_BID_LIMIT: usize = 50;
/// Bound on the value-ordered bid scan; the top-k walk rarely gets near it.
const BID_SCAN_LIMIT: i64 = 2_000;

const WEEK: u64 = 7 * 24 * 3_600;
const MONTH: u64 = 30 * 24 * 3_600;

#[derive(Debug, Clone, Default)]
pub struct NameCounts {
    /// Chain height the counts were computed at.
    pub height: i64,
    pub opening: i64,
    pub bidding: i64,
    pub reveal: i64,
    pub closed: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub top_value_names: Vec<NameListItem>,
    pub name_counts: NameCounts,
    pub top_bids_week: Vec<TopBidJson>,
    pub top_bids_month: Vec<TopBidJson>,
    pub refreshed_at: u64,
}

pub struct AggregateCache {
    db: Arc<Database>,
    client: Arc<dyn ChainApi>,
    params: chain_core::Params,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl AggregateCache {
    pub fn new(
        db: Arc<Database>,
        client: Arc<dyn ChainApi>,
        params: chain_core::Params,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            client,
            params,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        })
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Refresh forever: once after a settling delay, then on the interval.
    /// Failures keep the previous snapshot and re-arm the timer.
    pub async fn run(self: Arc<Self>) {
        tokio::time::sleep(SETTLE_DELAY).await;

        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            match self.refresh().await {
                Ok(()) => info!("aggregate cache refreshed"),
                Err(e) => error!("aggregate cache refresh failed: {e}"),
            }
        }
    }

    pub async fn refresh(&self) -> Result<()> {
        let pool = self.db.pool();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let top_value_names = NameQueries::top_by_value(pool, TOP_VALUE_LIMIT, 0)
            .await?
            .into_iter()
            .map(|row| NameListItem {
                name: row.name,
                name_hash: row.name_hash,
                open: row.open,
                value: row.value,
                highest: row.highest,
                state: None,
            })
            .collect();

        let name_counts = self.count_lifecycles().await?;
        let top_bids_week = self.top_bids((now - WEEK) as i64).await?;
        let top_bids_month = self.top_bids((now - MONTH) as i64).await?;

        let next = Arc::new(Snapshot {
            top_value_names,
            name_counts,
            top_bids_week,
            top_bids_month,
            refreshed_at: now,
        });

        *self.snapshot.write().await = next;
        Ok(())
    }

    async fn count_lifecycles(&self) -> Result<NameCounts> {
        let tip = self.client.get_tip().await?;
        let height = i64::from(tip.height);
        let pool = self.db.pool();

        let mut counts = NameCounts {
            height,
            ..Default::default()
        };
        for status in [
            NameStatus::Opening,
            NameStatus::Bidding,
            NameStatus::Reveal,
            NameStatus::Closed,
        ] {
            let (min, max) = status_window(status, height, &self.params);
            let count = NameQueries::count_by_open_window(pool, min, max).await?;
            match status {
                NameStatus::Opening => counts.opening = count,
                NameStatus::Bidding => counts.bidding = count,
                NameStatus::Reveal => counts.reveal = count,
                _ => counts.closed = count,
            }
        }

        Ok(counts)
    }

    /// Walk BID coins in descending value keeping the max bid per name;
    /// stop once the top set is full and the scan value falls below its
    /// smallest entry.
    async fn top_bids(&self, since: i64) -> Result<Vec<TopBidJson>> {
        let rows = CoinQueries::top_bids_since(self.db.pool(), since, BID_SCAN_LIMIT).await?;

        let mut best: HashMap<String, i64> = HashMap::new();
        for row in rows {
            let Some(name_hash) = row.name_hash else { continue };

            if best.len() >= TOP_BID_LIMIT && !best.contains_key(&name_hash) {
                let floor = best.values().copied().min().unwrap_or(0);
                if row.value < floor {
                    break;
                }
                if let Some(evict) = best
                    .iter()
                    .min_by_key(|(_, v)| **v)
                    .map(|(k, _)| k.clone())
                {
                    best.remove(&evict);
                }
            }

            let entry = best.entry(name_hash).or_insert(0);
            if row.value > *entry {
                *entry = row.value;
            }
        }

        let mut bids = Vec::with_capacity(best.len());
        for (name_hash, highest) in best {
            let name = NameQueries::get(self.db.pool(), &name_hash)
                .await?
                .map(|row| row.name)
                .unwrap_or_default();
            bids.push(TopBidJson {
                name,
                name_hash,
                highest,
            });
        }
        bids.sort_by(|a, b| b.highest.cmp(&a.highest));

        Ok(bids)
    }
}
