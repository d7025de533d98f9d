//! Read-side store lookups. Writes live in the indexer.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{BlockRow, CoinRow, MinerCount, NameRow, SummaryRow, TxRow};

pub struct BlockQueries;

impl BlockQueries {
    pub async fn max_height(pool: &SqlitePool) -> Result<Option<i64>> {
        let height: Option<i64> = sqlx::query_scalar("SELECT MAX(height) FROM blocks")
            .fetch_one(pool)
            .await?;
        Ok(height)
    }

    pub async fn get_by_height(pool: &SqlitePool, height: i64) -> Result<Option<BlockRow>> {
        let block = sqlx::query_as::<_, BlockRow>("SELECT * FROM blocks WHERE height = ?")
            .bind(height)
            .fetch_optional(pool)
            .await?;
        Ok(block)
    }

    pub async fn get_by_hash(pool: &SqlitePool, hash: &str) -> Result<Option<BlockRow>> {
        let block = sqlx::query_as::<_, BlockRow>("SELECT * FROM blocks WHERE hash = ?")
            .bind(hash)
            .fetch_optional(pool)
            .await?;
        Ok(block)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocks")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn page_desc(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<BlockRow>> {
        let blocks = sqlx::query_as::<_, BlockRow>(
            "SELECT * FROM blocks ORDER BY height DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(blocks)
    }

    /// Blocks-per-miner over `(start, end]`.
    pub async fn miner_counts(
        pool: &SqlitePool,
        start: i64,
        end: i64,
    ) -> Result<Vec<MinerCount>> {
        let counts = sqlx::query_as::<_, MinerCount>(
            r#"
            SELECT miner, COUNT(*) AS count
            FROM blocks
            WHERE time > ? AND time <= ?
            GROUP BY miner
            ORDER BY count DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(counts)
    }
}

pub struct TxQueries;

impl TxQueries {
    pub async fn get(pool: &SqlitePool, txid: &str) -> Result<Option<TxRow>> {
        let tx = sqlx::query_as::<_, TxRow>("SELECT * FROM txs WHERE txid = ?")
            .bind(txid)
            .fetch_optional(pool)
            .await?;
        Ok(tx)
    }

    pub async fn page_by_address(
        pool: &SqlitePool,
        address: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TxRow>> {
        let txs = sqlx::query_as::<_, TxRow>(
            r#"
            SELECT t.txid, t.height, t.hash, t.time
            FROM txs t
            INNER JOIN tx_addresses a ON t.txid = a.txid
            WHERE a.address = ?
            ORDER BY t.height DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(address)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(txs)
    }

    pub async fn count_by_address(pool: &SqlitePool, address: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tx_addresses WHERE address = ?")
                .bind(address)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}

pub struct CoinQueries;

impl CoinQueries {
    pub async fn get(pool: &SqlitePool, txid: &str, idx: i64) -> Result<Option<CoinRow>> {
        let coin = sqlx::query_as::<_, CoinRow>("SELECT * FROM coins WHERE txid = ? AND idx = ?")
            .bind(txid)
            .bind(idx)
            .fetch_optional(pool)
            .await?;
        Ok(coin)
    }

    /// All BID coins for a name, newest first.
    pub async fn bids_by_name(pool: &SqlitePool, name_hash: &str) -> Result<Vec<CoinRow>> {
        let coins = sqlx::query_as::<_, CoinRow>(
            r#"
            SELECT * FROM coins
            WHERE name_hash = ? AND covenant_type = 3
            ORDER BY time DESC
            "#,
        )
        .bind(name_hash)
        .fetch_all(pool)
        .await?;
        Ok(coins)
    }

    pub async fn history_page(
        pool: &SqlitePool,
        name_hash: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CoinRow>> {
        let coins = sqlx::query_as::<_, CoinRow>(
            "SELECT * FROM coins WHERE name_hash = ? ORDER BY time DESC LIMIT ? OFFSET ?",
        )
        .bind(name_hash)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(coins)
    }

    pub async fn history_count(pool: &SqlitePool, name_hash: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coins WHERE name_hash = ?")
            .bind(name_hash)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// `(received, spent)` totals for an address hash.
    pub async fn address_totals(pool: &SqlitePool, address: &str) -> Result<(i64, i64)> {
        let totals: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(value), 0),
                COALESCE(SUM(CASE WHEN spent THEN value ELSE 0 END), 0)
            FROM coins
            WHERE address = ?
            "#,
        )
        .bind(address)
        .fetch_one(pool)
        .await?;
        Ok(totals)
    }

    /// BID coins at or after `since`, highest lockup first. `limit` bounds the
    /// scan; the aggregate walk short-circuits long before it in practice.
    pub async fn top_bids_since(
        pool: &SqlitePool,
        since: i64,
        limit: i64,
    ) -> Result<Vec<CoinRow>> {
        let coins = sqlx::query_as::<_, CoinRow>(
            r#"
            SELECT * FROM coins
            WHERE covenant_type = 3 AND time >= ?
            ORDER BY value DESC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(coins)
    }

    pub async fn registered_names(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT name_hash) FROM coins WHERE covenant_type = 6",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

pub struct NameQueries;

impl NameQueries {
    pub async fn get(pool: &SqlitePool, name_hash: &str) -> Result<Option<NameRow>> {
        let name = sqlx::query_as::<_, NameRow>("SELECT * FROM names WHERE name_hash = ?")
            .bind(name_hash)
            .fetch_optional(pool)
            .await?;
        Ok(name)
    }

    pub async fn top_by_value(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<NameRow>> {
        let names = sqlx::query_as::<_, NameRow>(
            "SELECT * FROM names ORDER BY value DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(names)
    }

    /// Names whose latest open height lies in `(min, max]`, newest first.
    pub async fn page_by_open_window(
        pool: &SqlitePool,
        min: i64,
        max: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NameRow>> {
        let names = sqlx::query_as::<_, NameRow>(
            r#"
            SELECT * FROM names
            WHERE open > ? AND open <= ?
            ORDER BY open DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(min)
        .bind(max)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(names)
    }

    pub async fn count_by_open_window(pool: &SqlitePool, min: i64, max: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM names WHERE open > ? AND open <= ?")
                .bind(min)
                .bind(max)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM names")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

pub struct SummaryQueries;

impl SummaryQueries {
    pub async fn latest(pool: &SqlitePool) -> Result<Option<SummaryRow>> {
        let summary =
            sqlx::query_as::<_, SummaryRow>("SELECT * FROM summaries ORDER BY time DESC LIMIT 1")
                .fetch_optional(pool)
                .await?;
        Ok(summary)
    }

    pub async fn in_window(pool: &SqlitePool, start: i64, end: i64) -> Result<Vec<SummaryRow>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT * FROM summaries WHERE time >= ? AND time <= ? ORDER BY time ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
