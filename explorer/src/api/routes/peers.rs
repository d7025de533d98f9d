//! Peer listing and GeoIP map data.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use rpc_core::{GeoIp, PeerInfo};

use crate::api::AppState;
use crate::error::{ExplorerError, Result};
use crate::models::Paginated;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/peers", get(get_peers))
        .route("/mapdata", get(get_mapdata))
}

#[derive(Debug, Deserialize)]
struct PeerParams {
    page: Option<i64>,
    limit: Option<i64>,
}

#[axum::debug_handler]
async fn get_peers(
    State(state): State<AppState>,
    Query(params): Query<PeerParams>,
) -> Result<Json<Paginated<PeerInfo>>> {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(10);
    if page < 1 || limit < 1 {
        return Err(ExplorerError::Input("page and limit must be positive".into()));
    }

    let offset = (page - 1) * limit;
    let peers = state.engine.get_peers(offset, limit).await?;
    Ok(Json(peers))
}

#[axum::debug_handler]
async fn get_mapdata(State(state): State<AppState>) -> Result<Json<Vec<GeoIp>>> {
    let locations = state.engine.get_peers_location().await?;
    Ok(Json(locations))
}
