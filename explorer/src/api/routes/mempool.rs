//! Mempool route.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::routes::PageParams;
use crate::api::AppState;
use crate::error::Result;
use crate::query::types::TxJson;

pub fn routes() -> Router<AppState> {
    Router::new().route("/mempool", get(get_mempool))
}

#[derive(Debug, Serialize)]
struct MempoolPage {
    total: i64,
    limit: i64,
    offset: i64,
    items: Vec<TxJson>,
}

#[axum::debug_handler]
async fn get_mempool(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<MempoolPage>> {
    let (limit, offset) = params.resolve()?;

    let page = state.engine.get_mempool_page(offset, limit).await?;
    Ok(Json(MempoolPage {
        total: page.total,
        limit,
        offset,
        items: page.result,
    }))
}
