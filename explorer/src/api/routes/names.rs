//! Name routes: listings, detail and history.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use chain_core::rules;

use crate::api::routes::PageParams;
use crate::api::AppState;
use crate::error::{ExplorerError, Result};
use crate::models::Paginated;
use crate::query::types::{HistoryEventJson, NameInfoJson, TopBidJson};
use crate::query::NameStatus;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/names", get(list_names))
        .route("/names/:name", get(get_name))
        .route("/names/:name/history", get(get_name_history))
}

#[derive(Debug, Deserialize)]
struct NameListParams {
    #[serde(rename = "type")]
    list_type: Option<String>,
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[axum::debug_handler]
async fn list_names(
    State(state): State<AppState>,
    Query(params): Query<NameListParams>,
) -> Result<Json<Value>> {
    let (limit, offset) = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve()?;

    // type overrides status
    let value = match params.list_type.as_deref() {
        Some("value") => {
            serde_json::to_value(state.engine.get_names_by_value(offset, limit).await?)?
        }
        Some(kind @ ("weekBid" | "monthBid")) => {
            let snapshot = state.cache.snapshot().await;
            let bids = if kind == "weekBid" {
                &snapshot.top_bids_week
            } else {
                &snapshot.top_bids_month
            };
            serde_json::to_value(page_top_bids(bids, offset, limit))?
        }
        Some(other) => {
            return Err(ExplorerError::Input(format!("unknown type: {other}")));
        }
        None => {
            let status: NameStatus = params
                .status
                .as_deref()
                .unwrap_or("opening")
                .parse()?;
            serde_json::to_value(
                state
                    .engine
                    .get_names_by_status(status, offset, limit)
                    .await?,
            )?
        }
    };

    Ok(Json(value))
}

fn page_top_bids(bids: &[TopBidJson], offset: i64, limit: i64) -> Paginated<TopBidJson> {
    let result = bids
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect();
    Paginated::new(bids.len() as i64, limit, offset, result)
}

#[axum::debug_handler]
async fn get_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<NameInfoJson>> {
    let info = state.engine.get_name(&name).await?;
    Ok(Json(info))
}

#[axum::debug_handler]
async fn get_name_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<HistoryEventJson>>> {
    if !rules::verify_name(&name) {
        return Err(ExplorerError::Input(format!("invalid name: {name}")));
    }
    let (limit, offset) = params.resolve()?;

    let name_hash = rules::hash_name(&name).to_hex();
    let page = state
        .engine
        .get_name_history(&name_hash, offset, limit)
        .await?;
    Ok(Json(page))
}
