//! Block routes.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::routes::PageParams;
use crate::api::AppState;
use crate::error::{ExplorerError, Result};
use crate::models::Paginated;
use crate::query::types::BlockJson;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blocks", get(list_blocks))
        .route("/blocks/:height", get(get_block))
}

#[axum::debug_handler]
async fn list_blocks(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<BlockJson>>> {
    let (limit, offset) = params.resolve()?;

    let tip = state.engine.tip_height().await?;
    if offset > i64::from(tip) {
        return Err(ExplorerError::Input("offset is past the chain tip".into()));
    }

    let page = state.engine.get_blocks(limit, offset).await?;
    Ok(Json(page))
}

#[axum::debug_handler]
async fn get_block(
    State(state): State<AppState>,
    Path(height): Path<u32>,
) -> Result<Json<BlockJson>> {
    state
        .engine
        .get_block(height, true)
        .await?
        .map(Json)
        .ok_or(ExplorerError::NotFound("block"))
}
