//! Explorer entry point: wire config, store, node client, indexer, cache and
//! the HTTP API together.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use hns_explorer::api::ApiServer;
use hns_explorer::cache::AggregateCache;
use hns_explorer::config::Config;
use hns_explorer::database::Database;
use hns_explorer::indexer::IndexerService;
use hns_explorer::query::{ListenInfo, QueryEngine};
use hns_explorer::rpc_client::HsdClient;
use hns_explorer::Result;

use rpc_core::ChainApi;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("explorer.toml"));
    let config = Config::load(&config_path)?;
    let params = config.params()?;
    let pools = Arc::new(config.load_pools()?);

    info!(network = params.network.as_str(), "starting explorer");

    let db = Arc::new(Database::open(&config.db_path()).await?);
    db.migrate().await?;
    info!(path = %config.db_path().display(), "store ready");

    let client: Arc<dyn ChainApi> = Arc::new(HsdClient::new(
        config.node.url.clone(),
        config.node.api_key.clone(),
    ));

    let indexer = IndexerService::new(db.clone(), client.clone(), pools.clone()).await?;
    tokio::spawn(indexer.clone().start());

    let cache = AggregateCache::new(db.clone(), client.clone(), params);
    tokio::spawn(cache.clone().run());

    let listen = ListenInfo {
        host: config.http.host.clone(),
        port: config.http.port,
        auth: config.auth_enabled(),
    };
    let engine = Arc::new(QueryEngine::new(db, client, params, pools, listen));

    ApiServer::new(engine, cache, config).serve().await
}
