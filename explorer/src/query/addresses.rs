use crate::database::queries::CoinQueries;
use crate::error::Result;
use crate::query::types::{AddressBalanceJson, TxJson};
use crate::query::QueryEngine;

impl QueryEngine {
    /// Confirmed balance arithmetic over the coin index.
    pub async fn get_address(&self, hash: &str) -> Result<AddressBalanceJson> {
        let (received, spent) = CoinQueries::address_totals(self.pool(), hash).await?;

        Ok(AddressBalanceJson {
            hash: hash.to_string(),
            confirmed: received - spent,
            unconfirmed: 0,
            received,
            spent,
        })
    }

    pub async fn get_address_mempool(&self, hash: &str) -> Result<Vec<TxJson>> {
        let txids = self.client().get_mempool_by_address(hash).await?;

        let mut txs = Vec::with_capacity(txids.len());
        for txid in txids {
            if let Some(json) = self.get_transaction(txid).await? {
                txs.push(json);
            }
        }
        Ok(txs)
    }
}
