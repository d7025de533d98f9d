//! Transaction routes.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use chain_core::Hash;

use crate::api::routes::PageParams;
use crate::api::AppState;
use crate::error::{ExplorerError, Result};
use crate::models::Paginated;
use crate::query::types::TxJson;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/txs", get(list_txs))
        .route("/txs/:hash", get(get_tx))
}

#[derive(Debug, Deserialize)]
struct TxListParams {
    height: Option<u32>,
    address: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[axum::debug_handler]
async fn list_txs(
    State(state): State<AppState>,
    Query(params): Query<TxListParams>,
) -> Result<Json<Paginated<TxJson>>> {
    let (limit, offset) = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve()?;

    // height wins when both filters are present
    let page = match (params.height, params.address) {
        (Some(height), _) => {
            state
                .engine
                .get_transactions_by_height(height, offset, limit)
                .await?
        }
        (None, Some(address)) => {
            state
                .engine
                .get_transactions_by_address(&address, offset, limit)
                .await?
        }
        (None, None) => {
            let result = state.engine.get_transactions(limit as usize).await?;
            Paginated::new(result.len() as i64, limit, offset, result)
        }
    };

    Ok(Json(page))
}

#[axum::debug_handler]
async fn get_tx(State(state): State<AppState>, Path(hash): Path<String>) -> Result<Json<TxJson>> {
    let txid = Hash::from_hex(&hash)
        .map_err(|_| ExplorerError::Input(format!("bad transaction hash: {hash}")))?;

    state
        .engine
        .get_transaction(txid)
        .await?
        .map(Json)
        .ok_or(ExplorerError::NotFound("transaction"))
}
