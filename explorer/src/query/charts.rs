use std::str::FromStr;

use crate::database::queries::{BlockQueries, SummaryQueries};
use crate::error::{ExplorerError, Result};
use crate::query::types::{PoolDistributionJson, PoolShare, SeriesPoint};
use crate::query::QueryEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Difficulty,
    DailyTransactions,
    DailyTotalTransactions,
    Supply,
    Burned,
}

impl FromStr for ChartType {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "difficulty" => Ok(Self::Difficulty),
            "dailyTransactions" => Ok(Self::DailyTransactions),
            "dailyTotalTransactions" => Ok(Self::DailyTotalTransactions),
            "supply" => Ok(Self::Supply),
            "burned" => Ok(Self::Burned),
            other => Err(ExplorerError::Input(format!("unknown chart type: {other}"))),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl QueryEngine {
    pub async fn get_series(
        &self,
        chart: ChartType,
        start: i64,
        end: i64,
    ) -> Result<Vec<SeriesPoint>> {
        let rows = SummaryQueries::in_window(self.pool(), start, end).await?;

        let series = rows
            .into_iter()
            .map(|row| {
                let value = match chart {
                    ChartType::Difficulty => {
                        if row.blocks > 0 {
                            row.difficulty / row.blocks as f64
                        } else {
                            0.0
                        }
                    }
                    ChartType::DailyTransactions => row.txs as f64,
                    ChartType::DailyTotalTransactions => row.total_txs as f64,
                    ChartType::Supply => round2(row.supply),
                    ChartType::Burned => round2(row.burned),
                };
                SeriesPoint {
                    date: row.time * 1_000,
                    value,
                }
            })
            .collect();

        Ok(series)
    }

    /// Blocks-per-pool over `(start, end]`.
    pub async fn get_pool_distribution(
        &self,
        start: i64,
        end: i64,
    ) -> Result<PoolDistributionJson> {
        let counts = BlockQueries::miner_counts(self.pool(), start, end).await?;
        let total = counts.iter().map(|c| c.count).sum();

        let items = counts
            .into_iter()
            .map(|c| {
                let url = self
                    .pools
                    .get(&c.miner)
                    .map(|entry| entry.url.clone())
                    .unwrap_or_default();
                PoolShare {
                    pool_name: c.miner,
                    url,
                    count: c.count,
                }
            })
            .collect();

        Ok(PoolDistributionJson { total, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_names_match_routes() {
        assert_eq!(ChartType::from_str("difficulty").unwrap(), ChartType::Difficulty);
        assert_eq!(
            ChartType::from_str("dailyTotalTransactions").unwrap(),
            ChartType::DailyTotalTransactions
        );
        assert!(ChartType::from_str("hashrate").is_err());
    }

    #[test]
    fn rounding_is_two_decimal_places() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(0.004), 0.0);
    }
}
