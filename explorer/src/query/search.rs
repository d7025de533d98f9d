use chain_core::{rules, Address, Hash};

use crate::database::queries::{BlockQueries, TxQueries};
use crate::error::Result;
use crate::query::types::SearchHit;
use crate::query::QueryEngine;

fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl QueryEngine {
    /// Every heuristic that matches appends a hit; misses are silent. Order:
    /// block height, transaction, block by hash, address, name.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        let mut hits = Vec::new();
        if query.is_empty() {
            return Ok(hits);
        }

        // a numeric query is a height lookup, never a name
        let numeric = query.parse::<u32>().ok();
        if let Some(height) = numeric {
            let tip = self.client().get_tip().await?;
            if height <= tip.height {
                hits.push(SearchHit {
                    kind: "Block".to_string(),
                    url: format!("/block/{height}"),
                });
            }
        }

        if is_hex64(query) {
            let lower = query.to_ascii_lowercase();

            let known_tx = TxQueries::get(self.pool(), &lower).await?.is_some()
                || match Hash::from_hex(&lower) {
                    Ok(txid) => self.client().get_tx_meta(txid).await?.is_some(),
                    Err(_) => false,
                };
            if known_tx {
                hits.push(SearchHit {
                    kind: "Transaction".to_string(),
                    url: format!("/tx/{lower}"),
                });
            }

            if let Some(block) = BlockQueries::get_by_hash(self.pool(), &lower).await? {
                hits.push(SearchHit {
                    kind: "Block".to_string(),
                    url: format!("/block/{}", block.height),
                });
            }
        }

        if Address::looks_like_string(query, self.params().network.address_hrp()) {
            hits.push(SearchHit {
                kind: "Address".to_string(),
                url: format!("/address/{query}"),
            });
        }

        if numeric.is_none() && rules::verify_name(query) {
            hits.push(SearchHit {
                kind: "Name".to_string(),
                url: format!("/name/{query}"),
            });
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex64_detection() {
        assert!(is_hex64(&"ab".repeat(32)));
        assert!(!is_hex64(&"ab".repeat(31)));
        assert!(!is_hex64(&"zz".repeat(32)));
    }
}
