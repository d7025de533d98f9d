//! Per-block application: coins, transactions, the block record and its
//! pool attribution. Runs inside one store transaction per block.

use std::collections::HashSet;

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use chain_core::{Block, ChainEntry, CovenantType, Transaction};
use rpc_core::CoinView;

use crate::config::PoolTable;
use crate::error::Result;
use crate::indexer::{name_indexer::AuctionBook, summary_indexer};

pub async fn apply_block(
    conn: &mut SqliteConnection,
    pools: &PoolTable,
    entry: &ChainEntry,
    block: &Block,
    view: &CoinView,
) -> Result<()> {
    let height = i64::from(entry.height);
    let time = entry.time as i64;
    let block_hash = entry.hash.to_hex();

    let mut supply_delta: u64 = 0;
    let mut burned_delta: u64 = 0;
    let mut auctions = AuctionBook::default();

    for tx in &block.txs {
        let (supply, burned) = apply_tx(
            conn,
            &mut auctions,
            view,
            tx,
            height,
            time,
            &block_hash,
        )
        .await?;
        supply_delta += supply;
        burned_delta += burned;
    }

    auctions.flush(conn).await?;

    let miner_address = block
        .coinbase()
        .and_then(|cb| cb.outputs.first())
        .map(|o| o.address.hash.clone());
    let miner = miner_address
        .as_deref()
        .and_then(|addr| pools.attribute(addr))
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    sqlx::query(
        r#"
        INSERT INTO blocks (height, hash, difficulty, time, txs, miner, miner_address)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (height) DO UPDATE SET
            hash = excluded.hash,
            difficulty = excluded.difficulty,
            time = excluded.time,
            txs = excluded.txs,
            miner = excluded.miner,
            miner_address = excluded.miner_address
        "#,
    )
    .bind(height)
    .bind(&block_hash)
    .bind(entry.difficulty())
    .bind(time)
    .bind(block.txs.len() as i64)
    .bind(&miner)
    .bind(&miner_address)
    .execute(&mut *conn)
    .await?;

    summary_indexer::apply(
        conn,
        entry,
        block.txs.len() as i64,
        supply_delta,
        burned_delta,
    )
    .await?;

    Ok(())
}

/// Returns the `(supply, burned)` contribution of this transaction.
async fn apply_tx(
    conn: &mut SqliteConnection,
    auctions: &mut AuctionBook,
    view: &CoinView,
    tx: &Transaction,
    height: i64,
    time: i64,
    block_hash: &str,
) -> Result<(u64, u64)> {
    let txid = tx.hash.to_hex();
    let coinbase = tx.is_coinbase();
    let mut supply: u64 = 0;
    let mut burned: u64 = 0;
    let mut addresses: HashSet<String> = HashSet::new();

    // Inputs before outputs: an output spent later in the same block must
    // exist before its spender marks it.
    for (i, input) in tx.inputs.iter().enumerate() {
        if input.prevout.is_null() {
            continue;
        }
        let prev_txid = input.prevout.hash.to_hex();
        let prev_index = i64::from(input.prevout.index);

        let known: Option<(String,)> =
            sqlx::query_as("SELECT address FROM coins WHERE txid = ? AND idx = ?")
                .bind(&prev_txid)
                .bind(prev_index)
                .fetch_optional(&mut *conn)
                .await?;

        match known {
            Some((address,)) => {
                addresses.insert(address);
            }
            None => match view.get(&input.prevout) {
                Some(coin) => {
                    // coin predates the index; still attribute the spender
                    addresses.insert(coin.address.hash.clone());
                    debug!(prevout = %input.prevout, "prevout not in store, using view");
                }
                None => {
                    warn!(prevout = %input.prevout, tx = %txid, "missing prevout, skipping input");
                    continue;
                }
            },
        }

        sqlx::query(
            r#"
            UPDATE coins SET spent = TRUE, spent_txid = ?, spent_index = ?
            WHERE txid = ? AND idx = ?
            "#,
        )
        .bind(&txid)
        .bind(i as i64)
        .bind(&prev_txid)
        .bind(prev_index)
        .execute(&mut *conn)
        .await?;
    }

    for (index, output) in tx.outputs.iter().enumerate() {
        if coinbase {
            supply += output.value;
        }
        addresses.insert(output.address.hash.clone());

        let covenant = &output.covenant;
        let name_hash = covenant.name_hash().map(str::to_string);
        let items = serde_json::to_string(&covenant.items)?;

        sqlx::query(
            r#"
            INSERT INTO coins
                (txid, idx, height, time, address, value, covenant_type,
                 covenant_items, name_hash, coinbase, spent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE)
            ON CONFLICT (txid, idx) DO NOTHING
            "#,
        )
        .bind(&txid)
        .bind(index as i64)
        .bind(height)
        .bind(time)
        .bind(&output.address.hash)
        .bind(output.value as i64)
        .bind(i64::from(u8::from(covenant.covenant_type)))
        .bind(&items)
        .bind(&name_hash)
        .bind(coinbase)
        .execute(&mut *conn)
        .await?;

        let Some(name_hash) = name_hash else { continue };
        match covenant.covenant_type {
            CovenantType::Claim | CovenantType::Open => match covenant.name() {
                Some(name) => auctions.open(conn, &name_hash, &name, height).await?,
                None => warn!(tx = %txid, index, "open covenant without a name"),
            },
            CovenantType::Reveal => auctions.reveal(conn, &name_hash, output.value).await?,
            CovenantType::Register => burned += output.value,
            _ => {}
        }
    }

    sqlx::query(
        r#"
        INSERT INTO txs (txid, height, hash, time)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (txid) DO UPDATE SET
            height = excluded.height,
            hash = excluded.hash,
            time = excluded.time
        "#,
    )
    .bind(&txid)
    .bind(height)
    .bind(block_hash)
    .bind(time)
    .execute(&mut *conn)
    .await?;

    for address in &addresses {
        sqlx::query("INSERT INTO tx_addresses (txid, address) VALUES (?, ?) ON CONFLICT DO NOTHING")
            .bind(&txid)
            .bind(address)
            .execute(&mut *conn)
            .await?;
    }

    Ok((supply, burned))
}
