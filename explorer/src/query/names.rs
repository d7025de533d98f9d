use std::str::FromStr;

use chain_core::{rules, CovenantType, Hash, Params};

use crate::database::queries::{CoinQueries, NameQueries};
use crate::error::{ExplorerError, Result};
use crate::models::Paginated;
use crate::query::types::{
    BidJson, HistoryEventJson, NameInfoJson, NameListItem, OutpointJson, ReleaseJson,
};
use crate::query::QueryEngine;

/// Auction lifecycle buckets the listing API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStatus {
    Opening,
    Bidding,
    Reveal,
    Closed,
    Locked,
}

impl FromStr for NameStatus {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "opening" => Ok(Self::Opening),
            "bidding" => Ok(Self::Bidding),
            "reveal" => Ok(Self::Reveal),
            "closed" => Ok(Self::Closed),
            "locked" => Ok(Self::Locked),
            other => Err(ExplorerError::Input(format!("unknown status: {other}"))),
        }
    }
}

/// Open-height window `(min, max]` for names currently in `status`, inverted
/// from the auction phase lengths.
pub fn status_window(status: NameStatus, tip_height: i64, params: &Params) -> (i64, i64) {
    let open = i64::from(params.open_period());
    let bidding = i64::from(params.bidding_period);
    let reveal = i64::from(params.reveal_period);
    let h = tip_height;

    match status {
        NameStatus::Opening => (h - open, h),
        NameStatus::Bidding => (h - open - bidding, h - open),
        NameStatus::Reveal => (h - open - bidding - reveal, h - open - bidding),
        // locked names share the closed window; the live state tells them apart
        NameStatus::Closed | NameStatus::Locked => (0, h - open - bidding - reveal),
    }
}

/// State machine successor; CLOSED names renew rather than reopen.
pub fn next_state(state: &str) -> &'static str {
    match state {
        "OPENING" => "BIDDING",
        "BIDDING" => "REVEAL",
        "REVEAL" => "CLOSED",
        "CLOSED" => "RENEWAL",
        "LOCKED" => "CLOSED",
        _ => "OPENING",
    }
}

impl QueryEngine {
    pub async fn get_name(&self, name: &str) -> Result<NameInfoJson> {
        if !rules::verify_name(name) {
            return Err(ExplorerError::Input(format!("invalid name: {name}")));
        }

        let name_hash = rules::hash_name(name);
        let release = ReleaseJson {
            week: rules::rollout_week(&name_hash),
            start: rules::rollout_height(&name_hash, self.params()),
        };

        let tip = self.client().get_tip().await?;
        let state = self.client().get_name_state(name_hash).await?;

        let mut info = match state {
            Some(ns) if !ns.expired => {
                let blocks_until = blocks_until(&ns.state, ns.height, ns.renewal, tip.height, self.params());
                NameInfoJson {
                    name: name.to_string(),
                    name_hash: name_hash.to_hex(),
                    next_state: next_state(&ns.state).to_string(),
                    state: ns.state,
                    reserved: ns.claimed > 0,
                    release,
                    open: Some(ns.height),
                    value: ns.value,
                    highest: ns.highest,
                    renewal: ns.renewal,
                    renewals: ns.renewals,
                    weak: ns.weak,
                    transfer: ns.transfer,
                    revoked: ns.revoked,
                    blocks_until,
                    bids: Vec::new(),
                }
            }
            _ => NameInfoJson {
                name: name.to_string(),
                name_hash: name_hash.to_hex(),
                state: "INACTIVE".to_string(),
                reserved: false,
                release,
                open: None,
                value: 0,
                highest: 0,
                renewal: 0,
                renewals: 0,
                weak: false,
                transfer: 0,
                revoked: 0,
                blocks_until: None,
                next_state: next_state("INACTIVE").to_string(),
                bids: Vec::new(),
            },
        };

        let open_height = match info.open {
            Some(h) => i64::from(h),
            None => NameQueries::get(self.pool(), &info.name_hash)
                .await?
                .map(|row| row.open)
                .unwrap_or(0),
        };
        info.bids = self.get_name_bids(&info.name_hash, open_height).await?;

        Ok(info)
    }

    /// Bid listing with reveal joins and winner selection. A bid wins when
    /// its reveal carries the highest value among bids of the current auction
    /// (`height > open_height` fences off stale auctions for the same name).
    pub async fn get_name_bids(&self, name_hash: &str, open_height: i64) -> Result<Vec<BidJson>> {
        let rows = CoinQueries::bids_by_name(self.pool(), name_hash).await?;

        let mut bids = Vec::with_capacity(rows.len());
        let mut winner: Option<(usize, i64)> = None;

        for row in rows {
            let mut bid = BidJson {
                txid: row.txid.clone(),
                index: row.idx,
                lockup: row.value,
                time: row.time,
                revealed: false,
                reveal: None,
                value: 0,
                win: false,
            };

            if row.spent {
                if let (Some(spent_txid), Some(spent_index)) =
                    (row.spent_txid.clone(), row.spent_index)
                {
                    let reveal = CoinQueries::get(self.pool(), &spent_txid, spent_index).await?;
                    if let Some(reveal) =
                        reveal.filter(|c| c.covenant() == Some(CovenantType::Reveal))
                    {
                        bid.revealed = true;
                        bid.value = reveal.value;
                        bid.reveal = Some(OutpointJson {
                            txid: spent_txid,
                            index: spent_index,
                        });

                        if row.height > open_height
                            && winner.map(|(_, best)| reveal.value > best).unwrap_or(true)
                        {
                            winner = Some((bids.len(), reveal.value));
                        }
                    }
                }
            }

            bids.push(bid);
        }

        if let Some((index, _)) = winner {
            bids[index].win = true;
        }

        Ok(bids)
    }

    pub async fn get_name_history(
        &self,
        name_hash: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Paginated<HistoryEventJson>> {
        let rows = CoinQueries::history_page(self.pool(), name_hash, limit, offset).await?;
        let total = CoinQueries::history_count(self.pool(), name_hash).await?;

        let result = rows
            .into_iter()
            .map(|row| {
                let action = row
                    .covenant()
                    .map(|c| c.action_label().to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                let value = match row.covenant() {
                    Some(
                        CovenantType::Bid | CovenantType::Reveal | CovenantType::Redeem,
                    ) => Some(row.value),
                    _ => None,
                };
                HistoryEventJson {
                    action,
                    txid: row.txid,
                    index: row.idx,
                    height: row.height,
                    time: row.time,
                    value,
                }
            })
            .collect();

        Ok(Paginated::new(total, limit, offset, result))
    }

    /// Top names by the price their winner pays.
    pub async fn get_names_by_value(&self, offset: i64, limit: i64) -> Result<Paginated<NameListItem>> {
        let rows = NameQueries::top_by_value(self.pool(), limit, offset).await?;
        let total = NameQueries::count(self.pool()).await?;
        let result = rows
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
        Ok(Paginated::new(total, limit, offset, result))
    }

    /// Names currently in a lifecycle bucket, joined with live consensus
    /// state.
    pub async fn get_names_by_status(
        &self,
        status: NameStatus,
        offset: i64,
        limit: i64,
    ) -> Result<Paginated<NameListItem>> {
        let tip = self.client().get_tip().await?;
        let (min, max) = status_window(status, i64::from(tip.height), self.params());

        let rows = NameQueries::page_by_open_window(self.pool(), min, max, limit, offset).await?;
        let total = NameQueries::count_by_open_window(self.pool(), min, max).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let mut item = NameListItem {
                name: row.name,
                name_hash: row.name_hash,
                open: row.open,
                value: row.value,
                highest: row.highest,
                state: None,
            };
            if let Ok(hash) = Hash::from_hex(&item.name_hash) {
                if let Some(ns) = self.client().get_name_state(hash).await? {
                    item.state = Some(ns.state);
                    item.value = ns.value as i64;
                    item.highest = ns.highest as i64;
                }
            }
            result.push(item);
        }

        Ok(Paginated::new(total, limit, offset, result))
    }
}

/// Blocks until the next lifecycle transition, from the phase lengths.
fn blocks_until(
    state: &str,
    open: u32,
    renewal: u32,
    tip_height: u32,
    params: &Params,
) -> Option<u32> {
    let target = match state {
        "OPENING" => open + params.open_period(),
        "BIDDING" => open + params.open_period() + params.bidding_period,
        "REVEAL" => open + params.open_period() + params.bidding_period + params.reveal_period,
        "CLOSED" => renewal + params.renewal_window,
        _ => return None,
    };
    Some(target.saturating_sub(tip_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::Network;

    fn params() -> Params {
        Params::for_network(Network::Main)
    }

    #[test]
    fn windows_tile_the_chain() {
        let p = params();
        let h = 100_000;

        let (_, opening_max) = status_window(NameStatus::Opening, h, &p);
        let (opening_min, _) = status_window(NameStatus::Opening, h, &p);
        let (bidding_min, bidding_max) = status_window(NameStatus::Bidding, h, &p);
        let (reveal_min, reveal_max) = status_window(NameStatus::Reveal, h, &p);
        let (closed_min, closed_max) = status_window(NameStatus::Closed, h, &p);

        assert_eq!(opening_max, h);
        assert_eq!(bidding_max, opening_min);
        assert_eq!(reveal_max, bidding_min);
        assert_eq!(closed_max, reveal_min);
        assert_eq!(closed_min, 0);
    }

    #[test]
    fn opening_window_length_matches_open_period() {
        let p = params();
        let (min, max) = status_window(NameStatus::Opening, 1_000, &p);
        assert_eq!(max - min, i64::from(p.open_period()));
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(NameStatus::from_str("OPENING").unwrap(), NameStatus::Opening);
        assert_eq!(NameStatus::from_str("Bidding").unwrap(), NameStatus::Bidding);
        assert_eq!(NameStatus::from_str("locked").unwrap(), NameStatus::Locked);
        assert!(NameStatus::from_str("galloping").is_err());
    }

    #[test]
    fn closed_names_renew() {
        assert_eq!(next_state("CLOSED"), "RENEWAL");
        assert_eq!(next_state("REVEAL"), "CLOSED");
        assert_eq!(next_state("INACTIVE"), "OPENING");
    }
}
