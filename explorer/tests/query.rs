//! Query engine scenarios over an indexed scripted chain.

mod common;

use std::sync::Arc;

use common::{addr, MockChain};

use chain_core::{rules, CovenantType, Network, Outpoint, Params, COIN};
use rpc_core::{ChainApi, NameState};

use hns_explorer::config::PoolTable;
use hns_explorer::database::Database;
use hns_explorer::indexer::IndexerService;
use hns_explorer::query::{ChartType, ListenInfo, NameStatus, QueryEngine};

async fn indexed(chain: &Arc<MockChain>) -> (Arc<Database>, QueryEngine) {
    let db = Arc::new(Database::memory().await.unwrap());
    db.migrate().await.unwrap();

    let client: Arc<dyn ChainApi> = chain.clone();
    let service = IndexerService::new(db.clone(), client, Arc::new(PoolTable::default()))
        .await
        .unwrap();
    service.sync().await;

    let engine = QueryEngine::new(
        db.clone(),
        chain.clone(),
        Params::for_network(Network::Regtest),
        Arc::new(PoolTable::default()),
        ListenInfo {
            host: "127.0.0.1".to_string(),
            port: 8080,
            auth: false,
        },
    );
    (db, engine)
}

#[tokio::test]
async fn search_routes_heuristics() {
    let chain = MockChain::new();
    for _ in 0..43 {
        chain.push_block(&addr(1), vec![]);
    }
    let (_db, engine) = indexed(&chain).await;

    // numeric below the tip
    let hits = engine.search("42").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, "Block");
    assert_eq!(hits[0].url, "/block/42");

    // numeric past the tip
    assert!(engine.search("44").await.unwrap().is_empty());

    // valid name
    let hits = engine.search("handshake").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, "Name");
    assert_eq!(hits[0].url, "/name/handshake");

    // known transaction by hash
    let txid = chain.block_txid(5, 0);
    let hits = engine.search(&txid.to_hex()).await.unwrap();
    assert!(hits.iter().any(|h| h.kind == "Transaction"));

    // block by hash resolves to its height
    let block_hash = chain.tip_at(7).hash;
    let hits = engine.search(&block_hash.to_hex()).await.unwrap();
    assert!(hits.iter().any(|h| h.kind == "Block" && h.url == "/block/7"));

    // address syntax
    let hits = engine
        .search("rs1qaxpy24lcpnravmvwjzq2v5hzrlxlcsequdu8a5")
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.kind == "Address"));
}

#[tokio::test]
async fn block_assembly_reward_and_fees() {
    let chain = MockChain::new();
    let genesis = chain.push_block(&addr(1), vec![]);
    let coinbase_txid = chain.block_txid(genesis.height, 0);

    // block 1 collects 150 base units in fees
    let spend = chain.spend_tx(Outpoint::new(coinbase_txid, 0), 1_000 * COIN, &addr(2));
    chain.push_block_full(&addr(1), vec![spend], None, 2_000 * COIN + 150);

    let (_db, engine) = indexed(&chain).await;

    let block = engine.get_block(1, true).await.unwrap().unwrap();
    assert_eq!(block.reward, 2_000 * COIN);
    assert_eq!(block.fees, 150);
    assert_eq!(block.tx_count, 2);
    assert_eq!(block.average_fee, 75.0);
    assert_eq!(block.miner, "unknown");

    let txs = block.txs.expect("details requested");
    assert_eq!(txs.len(), 2);

    // coinbase input reports the subsidy
    let coinbase = &txs[0];
    assert!(coinbase.inputs[0].coinbase);
    assert_eq!(coinbase.inputs[0].value, Some(2_000 * COIN));

    // the spend input resolves through the view
    let spend = &txs[1];
    assert_eq!(spend.inputs[0].value, Some(2_000 * COIN));
    assert_eq!(spend.inputs[0].address.as_deref(), Some(addr(1).hash.as_str()));

    assert!(engine.get_block(99, false).await.unwrap().is_none());
}

#[tokio::test]
async fn transaction_outputs_normalize_by_covenant() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);

    let open = chain.covenant_tx(None, 0, &addr(2), CovenantType::Open, "alice", None);
    let bid = chain.covenant_tx(None, 25 * COIN, &addr(3), CovenantType::Bid, "alice", None);
    let open_txid = open.hash;
    let bid_txid = bid.hash;
    chain.push_block(&addr(1), vec![open, bid]);

    let (_db, engine) = indexed(&chain).await;

    let open_tx = engine.get_transaction(open_txid).await.unwrap().unwrap();
    let output = &open_tx.outputs[0];
    assert_eq!(output.action, "OPEN");
    assert_eq!(output.name.as_deref(), Some("alice"));
    assert_eq!(
        output.name_hash.as_deref(),
        Some(rules::hash_name("alice").to_hex().as_str())
    );
    assert_eq!(output.value, None);

    let bid_tx = engine.get_transaction(bid_txid).await.unwrap().unwrap();
    let output = &bid_tx.outputs[0];
    assert_eq!(output.action, "BID");
    assert_eq!(output.name.as_deref(), Some("alice"));
    assert_eq!(output.value, Some(25 * COIN));
}

#[tokio::test]
async fn names_by_status_window_and_pagination() {
    let chain = MockChain::new();
    let params = Params::for_network(Network::Regtest);
    chain.push_block(&addr(1), vec![]);

    // three names opened on consecutive blocks, all within the opening window
    for name in ["alpha", "beta", "gamma"] {
        let open = chain.covenant_tx(None, 0, &addr(2), CovenantType::Open, name, None);
        chain.push_block(&addr(1), vec![open]);
    }
    assert!(chain.tip_sync().height <= params.open_period());

    let (_db, engine) = indexed(&chain).await;

    let page = engine
        .get_names_by_status(NameStatus::Opening, 0, 2)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.result.len(), 2);
    // newest open first
    assert_eq!(page.result[0].name, "gamma");

    let rest = engine
        .get_names_by_status(NameStatus::Opening, 2, 2)
        .await
        .unwrap();
    assert_eq!(rest.result.len(), 1);

    // nothing has aged into bidding yet
    let bidding = engine
        .get_names_by_status(NameStatus::Bidding, 0, 10)
        .await
        .unwrap();
    assert_eq!(bidding.total, 0);
}

#[tokio::test]
async fn name_info_joins_live_state() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);

    let open = chain.covenant_tx(None, 0, &addr(2), CovenantType::Open, "alice", None);
    chain.push_block(&addr(1), vec![open]);

    chain.set_name_state(NameState {
        name: "alice".to_string(),
        name_hash: rules::hash_name("alice"),
        state: "BIDDING".to_string(),
        height: 1,
        renewal: 0,
        renewals: 0,
        owner: None,
        value: 0,
        highest: 0,
        data: String::new(),
        transfer: 0,
        revoked: 0,
        claimed: 0,
        weak: false,
        expired: false,
    });

    let (_db, engine) = indexed(&chain).await;

    let info = engine.get_name("alice").await.unwrap();
    assert_eq!(info.state, "BIDDING");
    assert_eq!(info.next_state, "REVEAL");
    assert_eq!(info.open, Some(1));
    assert!(!info.reserved);
    assert!(info.release.week < 52);

    // unknown name reports INACTIVE rather than erroring
    let info = engine.get_name("nonexistent").await.unwrap();
    assert_eq!(info.state, "INACTIVE");
    assert_eq!(info.next_state, "OPENING");
    assert!(info.bids.is_empty());

    assert!(engine.get_name("Not A Name").await.is_err());
}

#[tokio::test]
async fn name_history_labels_actions() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);

    let open = chain.covenant_tx(None, 0, &addr(2), CovenantType::Open, "alice", None);
    chain.push_block(&addr(1), vec![open]);
    let bid = chain.covenant_tx(None, 40 * COIN, &addr(3), CovenantType::Bid, "alice", None);
    chain.push_block(&addr(1), vec![bid]);

    let (_db, engine) = indexed(&chain).await;

    let name_hash = rules::hash_name("alice").to_hex();
    let history = engine.get_name_history(&name_hash, 0, 25).await.unwrap();
    assert_eq!(history.total, 2);

    // newest first
    assert_eq!(history.result[0].action, "Bid");
    assert_eq!(history.result[0].value, Some((40 * COIN) as i64));
    assert_eq!(history.result[1].action, "Opened");
    assert_eq!(history.result[1].value, None);
}

#[tokio::test]
async fn chart_series_average_difficulty() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);
    chain.push_block(&addr(1), vec![]);

    let (_db, engine) = indexed(&chain).await;

    let series = engine
        .get_series(ChartType::Difficulty, 0, i64::MAX)
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    // two blocks at difficulty 1.0 average to 1.0
    assert!((series[0].value - 1.0).abs() < 1e-9);

    let txs = engine
        .get_series(ChartType::DailyTransactions, 0, i64::MAX)
        .await
        .unwrap();
    assert_eq!(txs[0].value, 2.0);

    let supply = engine
        .get_series(ChartType::Supply, 0, i64::MAX)
        .await
        .unwrap();
    assert_eq!(supply[0].value, 4_000.0);
}

#[tokio::test]
async fn summary_counts_registered_names() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);

    let register = chain.covenant_tx(None, 9 * COIN, &addr(2), CovenantType::Register, "alice", None);
    chain.push_block(&addr(1), vec![register]);

    let (_db, engine) = indexed(&chain).await;

    let summary = engine.get_summary().await.unwrap();
    assert_eq!(summary.registered_names, 1);
    assert_eq!(summary.network, "regtest");
    assert_eq!(summary.unconfirmed, 0);
}

#[tokio::test]
async fn pool_distribution_counts_by_window() {
    let chain = MockChain::new();
    chain.push_block(&addr(1), vec![]);
    chain.push_block(&addr(1), vec![]);
    chain.push_block(&addr(1), vec![]);

    let (_db, engine) = indexed(&chain).await;

    let distribution = engine
        .get_pool_distribution(0, i64::MAX)
        .await
        .unwrap();
    assert_eq!(distribution.total, 3);
    assert_eq!(distribution.items.len(), 1);
    assert_eq!(distribution.items[0].pool_name, "unknown");
    assert_eq!(distribution.items[0].count, 3);
}
