//! Address routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::AppState;
use crate::error::Result;
use crate::query::types::{AddressBalanceJson, TxJson};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/addresses/:hash", get(get_address))
        .route("/address/:hash/mempool", get(get_address_mempool))
}

#[axum::debug_handler]
async fn get_address(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<AddressBalanceJson>> {
    let balance = state.engine.get_address(&hash.to_ascii_lowercase()).await?;
    Ok(Json(balance))
}

#[axum::debug_handler]
async fn get_address_mempool(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<Vec<TxJson>>> {
    let txs = state
        .engine
        .get_address_mempool(&hash.to_ascii_lowercase())
        .await?;
    Ok(Json(txs))
}
