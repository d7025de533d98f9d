//! Per-day rolling aggregates.

use sqlx::SqliteConnection;

use chain_core::{ChainEntry, COIN, DAY};

use crate::error::Result;
use crate::models::SummaryRow;

/// Day bucket for a block timestamp: start of its UTC day.
pub fn day_bucket(time: u64) -> i64 {
    (time - time % DAY) as i64
}

/// Fold one block into its day row. The first block of a new day seeds the
/// cumulative columns from the most recent prior day.
pub async fn apply(
    conn: &mut SqliteConnection,
    entry: &ChainEntry,
    tx_count: i64,
    supply_delta: u64,
    burned_delta: u64,
) -> Result<()> {
    let day = day_bucket(entry.time);
    let supply = supply_delta as f64 / COIN as f64;
    let burned = burned_delta as f64 / COIN as f64;
    let difficulty = entry.difficulty();

    let current: Option<SummaryRow> =
        sqlx::query_as("SELECT * FROM summaries WHERE time <= ? ORDER BY time DESC LIMIT 1")
            .bind(day)
            .fetch_optional(&mut *conn)
            .await?;

    match current {
        Some(row) if row.time == day => {
            sqlx::query(
                r#"
                UPDATE summaries SET
                    blocks = blocks + 1,
                    txs = txs + ?,
                    total_txs = total_txs + ?,
                    difficulty = difficulty + ?,
                    supply = supply + ?,
                    burned = burned + ?
                WHERE time = ?
                "#,
            )
            .bind(tx_count)
            .bind(tx_count)
            .bind(difficulty)
            .bind(supply)
            .bind(burned)
            .bind(day)
            .execute(&mut *conn)
            .await?;
        }
        prev => {
            let (prev_total, prev_supply, prev_burned) = prev
                .map(|row| (row.total_txs, row.supply, row.burned))
                .unwrap_or((0, 0.0, 0.0));

            sqlx::query(
                r#"
                INSERT INTO summaries (time, blocks, txs, total_txs, difficulty, supply, burned)
                VALUES (?, 1, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(day)
            .bind(tx_count)
            .bind(prev_total + tx_count)
            .bind(difficulty)
            .bind(prev_supply + supply)
            .bind(prev_burned + burned)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bucket_floors_to_utc_midnight() {
        assert_eq!(day_bucket(0), 0);
        assert_eq!(day_bucket(86_399), 0);
        assert_eq!(day_bucket(86_400), 86_400);
        assert_eq!(day_bucket(1_700_000_000), 1_699_920_000);
    }
}
