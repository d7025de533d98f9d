//! Name auction bookkeeping for a block being applied.

use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::error::Result;

/// Second-price update: `value` is the runner-up reveal (the price the winner
/// pays), `highest` the winning reveal.
pub fn second_price(value: u64, highest: u64, reveal: u64) -> (u64, u64) {
    if reveal <= value {
        (value, highest)
    } else if reveal <= highest {
        (reveal, highest)
    } else {
        (highest, reveal)
    }
}

/// In-block auction state. Reveals must see earlier reveals from the same
/// block, so per-name `(value, highest)` pairs are held here and flushed once
/// at the end of the block; the first reveal for a name seeds from the store.
#[derive(Default)]
pub struct AuctionBook {
    pending: HashMap<String, (u64, u64)>,
}

impl AuctionBook {
    /// CLAIM/OPEN restarts the auction for a name.
    pub async fn open(
        &mut self,
        conn: &mut SqliteConnection,
        name_hash: &str,
        name: &str,
        height: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO names (name_hash, name, open, value, highest)
            VALUES (?, ?, ?, 0, 0)
            ON CONFLICT (name_hash) DO UPDATE SET
                name = excluded.name,
                open = excluded.open,
                value = 0,
                highest = 0
            "#,
        )
        .bind(name_hash)
        .bind(name)
        .bind(height)
        .execute(&mut *conn)
        .await?;

        self.pending.insert(name_hash.to_string(), (0, 0));
        Ok(())
    }

    pub async fn reveal(
        &mut self,
        conn: &mut SqliteConnection,
        name_hash: &str,
        reveal: u64,
    ) -> Result<()> {
        let (value, highest) = match self.pending.get(name_hash) {
            Some(&pair) => pair,
            None => {
                let row: Option<(i64, i64)> =
                    sqlx::query_as("SELECT value, highest FROM names WHERE name_hash = ?")
                        .bind(name_hash)
                        .fetch_optional(&mut *conn)
                        .await?;
                row.map(|(v, h)| (v as u64, h as u64)).unwrap_or((0, 0))
            }
        };

        let updated = second_price(value, highest, reveal);
        self.pending.insert(name_hash.to_string(), updated);
        Ok(())
    }

    /// Write accumulated auction updates. A reveal for a name the indexer
    /// never saw opened leaves no record; the store only tracks auctions whose
    /// OPEN it observed.
    pub async fn flush(self, conn: &mut SqliteConnection) -> Result<()> {
        for (name_hash, (value, highest)) in self.pending {
            sqlx::query("UPDATE names SET value = ?, highest = ? WHERE name_hash = ?")
                .bind(value as i64)
                .bind(highest as i64)
                .bind(&name_hash)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_price_keeps_runner_up() {
        // reveals 300, 100, 200 -> winner pays 200
        let (v, h) = second_price(0, 0, 300);
        assert_eq!((v, h), (0, 300));
        let (v, h) = second_price(v, h, 100);
        assert_eq!((v, h), (100, 300));
        let (v, h) = second_price(v, h, 200);
        assert_eq!((v, h), (200, 300));
    }

    #[test]
    fn second_price_new_winner_demotes_old() {
        let (v, h) = second_price(100, 300, 500);
        assert_eq!((v, h), (300, 500));
    }

    #[test]
    fn second_price_ignores_low_reveal() {
        let (v, h) = second_price(200, 300, 150);
        assert_eq!((v, h), (200, 300));
    }

    #[test]
    fn value_never_exceeds_highest() {
        let reveals = [5u64, 900, 17, 300, 1, 650];
        let (mut v, mut h) = (0u64, 0u64);
        for r in reveals {
            let next = second_price(v, h, r);
            v = next.0;
            h = next.1;
            assert!(v <= h);
        }
        assert_eq!((v, h), (650, 900));
    }

    #[test]
    fn tied_top_reveals_pay_full_price() {
        let (v, h) = second_price(300, 900, 900);
        assert_eq!((v, h), (900, 900));
    }
}
