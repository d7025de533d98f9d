//! Read-side assembly: joins indexer-derived records with live consensus
//! data from the node into explorer responses.

mod addresses;
mod blocks;
mod charts;
mod names;
mod search;
mod status;
mod txs;

pub mod types;

pub use charts::ChartType;
pub use names::{status_window, NameStatus};

use std::sync::Arc;

use sqlx::SqlitePool;

use chain_core::Params;
use rpc_core::ChainApi;

use crate::config::PoolTable;
use crate::database::Database;

/// Where the HTTP listener lives, echoed by `/status`.
#[derive(Debug, Clone)]
pub struct ListenInfo {
    pub host: String,
    pub port: u16,
    pub auth: bool,
}

pub struct QueryEngine {
    db: Arc<Database>,
    client: Arc<dyn ChainApi>,
    params: Params,
    pools: Arc<PoolTable>,
    listen: ListenInfo,
}

impl QueryEngine {
    pub fn new(
        db: Arc<Database>,
        client: Arc<dyn ChainApi>,
        params: Params,
        pools: Arc<PoolTable>,
        listen: ListenInfo,
    ) -> Self {
        Self {
            db,
            client,
            params,
            pools,
            listen,
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    pub(crate) fn client(&self) -> &Arc<dyn ChainApi> {
        &self.client
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}
