//! Network summary and node status routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::AppState;
use crate::error::Result;
use crate::query::types::{StatusJson, SummaryJson};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/status", get(get_status))
}

#[axum::debug_handler]
async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryJson>> {
    let summary = state.engine.get_summary().await?;
    Ok(Json(summary))
}

#[axum::debug_handler]
async fn get_status(State(state): State<AppState>) -> Result<Json<StatusJson>> {
    let status = state.engine.get_status().await?;
    Ok(Json(status))
}
