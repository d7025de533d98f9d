//! Chart series routes.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::AppState;
use crate::error::Result;
use crate::query::types::SeriesPoint;
use crate::query::ChartType;

pub fn routes() -> Router<AppState> {
    Router::new().route("/charts/:type", get(get_chart))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl TimeWindow {
    pub fn resolve(&self) -> (i64, i64) {
        let end = self.end_time.unwrap_or(i64::MAX);
        (self.start_time.unwrap_or(0), end)
    }
}

#[axum::debug_handler]
async fn get_chart(
    State(state): State<AppState>,
    Path(chart_type): Path<String>,
    Query(window): Query<TimeWindow>,
) -> Result<Json<Vec<SeriesPoint>>> {
    let chart: ChartType = chart_type.parse()?;
    let (start, end) = window.resolve();

    let series = state.engine.get_series(chart, start, end).await?;
    Ok(Json(series))
}
