//! Mining pool distribution route.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::routes::charts::TimeWindow;
use crate::api::AppState;
use crate::error::Result;
use crate::query::types::PoolDistributionJson;

pub fn routes() -> Router<AppState> {
    Router::new().route("/pool/distribution", get(get_distribution))
}

#[axum::debug_handler]
async fn get_distribution(
    State(state): State<AppState>,
    Query(window): Query<TimeWindow>,
) -> Result<Json<PoolDistributionJson>> {
    let (start, end) = window.resolve();
    let distribution = state.engine.get_pool_distribution(start, end).await?;
    Ok(Json(distribution))
}
