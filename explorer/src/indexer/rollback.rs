//! Reorg rollback: erase or revert everything above a height, leaving the
//! store identical to a fresh scan that stopped there.

use sqlx::{SqlitePool, SqliteConnection};
use tracing::info;

use chain_core::{COIN, DAY};

use crate::error::Result;

pub async fn rollback(pool: &SqlitePool, height: i64) -> Result<()> {
    let height = height.max(0);
    let mut dbtx = pool.begin().await?;

    // Names whose reveals are about to disappear; their second-price pair
    // must be recomputed from whatever survives.
    let touched: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT name_hash FROM coins
        WHERE covenant_type = 4 AND height > ? AND name_hash IS NOT NULL
        "#,
    )
    .bind(height)
    .fetch_all(&mut *dbtx)
    .await?;

    // Spends recorded by rolled-back transactions come undone.
    sqlx::query(
        r#"
        UPDATE coins SET spent = FALSE, spent_txid = NULL, spent_index = NULL
        WHERE spent_txid IN (SELECT txid FROM txs WHERE height > ?)
        "#,
    )
    .bind(height)
    .execute(&mut *dbtx)
    .await?;

    sqlx::query("DELETE FROM coins WHERE height > ?")
        .bind(height)
        .execute(&mut *dbtx)
        .await?;
    sqlx::query("DELETE FROM tx_addresses WHERE txid IN (SELECT txid FROM txs WHERE height > ?)")
        .bind(height)
        .execute(&mut *dbtx)
        .await?;
    sqlx::query("DELETE FROM txs WHERE height > ?")
        .bind(height)
        .execute(&mut *dbtx)
        .await?;
    sqlx::query("DELETE FROM blocks WHERE height > ?")
        .bind(height)
        .execute(&mut *dbtx)
        .await?;
    sqlx::query("DELETE FROM names WHERE open > ?")
        .bind(height)
        .execute(&mut *dbtx)
        .await?;

    for (name_hash,) in &touched {
        recompute_auction(&mut dbtx, name_hash).await?;
    }

    rebuild_summaries(&mut dbtx).await?;

    dbtx.commit().await?;
    info!(height, "rolled back store");
    Ok(())
}

/// Re-derive `(value, highest)` from the surviving reveals of the current
/// auction. Order does not matter: the pair is just the top two reveal values.
async fn recompute_auction(conn: &mut SqliteConnection, name_hash: &str) -> Result<()> {
    let open: Option<(i64,)> = sqlx::query_as("SELECT open FROM names WHERE name_hash = ?")
        .bind(name_hash)
        .fetch_optional(&mut *conn)
        .await?;
    let Some((open,)) = open else {
        return Ok(());
    };

    let top: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT value FROM coins
        WHERE name_hash = ? AND covenant_type = 4 AND height > ?
        ORDER BY value DESC
        LIMIT 2
        "#,
    )
    .bind(name_hash)
    .bind(open)
    .fetch_all(&mut *conn)
    .await?;

    let highest = top.first().map(|(v,)| *v).unwrap_or(0);
    let value = top.get(1).map(|(v,)| *v).unwrap_or(0);

    sqlx::query("UPDATE names SET value = ?, highest = ? WHERE name_hash = ?")
        .bind(value)
        .bind(highest)
        .bind(name_hash)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Drop day rows past the new tip's day and rebuild that day from the
/// surviving blocks and coins, re-seeding cumulative columns from the prior
/// day.
async fn rebuild_summaries(conn: &mut SqliteConnection) -> Result<()> {
    let tip_time: Option<(i64,)> = sqlx::query_as(
        "SELECT time FROM blocks WHERE height = (SELECT MAX(height) FROM blocks)",
    )
    .fetch_optional(&mut *conn)
    .await?;

    let Some((tip_time,)) = tip_time else {
        sqlx::query("DELETE FROM summaries").execute(&mut *conn).await?;
        return Ok(());
    };

    let day = tip_time - tip_time.rem_euclid(DAY as i64);
    let day_end = day + DAY as i64;

    sqlx::query("DELETE FROM summaries WHERE time > ?")
        .bind(day)
        .execute(&mut *conn)
        .await?;

    let (blocks, txs, difficulty): (i64, i64, f64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(txs), 0), COALESCE(SUM(difficulty), 0)
        FROM blocks WHERE time >= ? AND time < ?
        "#,
    )
    .bind(day)
    .bind(day_end)
    .fetch_one(&mut *conn)
    .await?;

    let (supply,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(value), 0) FROM coins WHERE coinbase AND time >= ? AND time < ?",
    )
    .bind(day)
    .bind(day_end)
    .fetch_one(&mut *conn)
    .await?;

    let (burned,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(value), 0) FROM coins
        WHERE covenant_type = 6 AND time >= ? AND time < ?
        "#,
    )
    .bind(day)
    .bind(day_end)
    .fetch_one(&mut *conn)
    .await?;

    let prev: Option<(i64, f64, f64)> = sqlx::query_as(
        "SELECT total_txs, supply, burned FROM summaries WHERE time < ? ORDER BY time DESC LIMIT 1",
    )
    .bind(day)
    .fetch_optional(&mut *conn)
    .await?;
    let (prev_total, prev_supply, prev_burned) = prev.unwrap_or((0, 0.0, 0.0));

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO summaries (time, blocks, txs, total_txs, difficulty, supply, burned)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(day)
    .bind(blocks)
    .bind(txs)
    .bind(prev_total + txs)
    .bind(difficulty)
    .bind(prev_supply + supply as f64 / COIN as f64)
    .bind(prev_burned + burned as f64 / COIN as f64)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
