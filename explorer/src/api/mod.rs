//! HTTP surface: routing, validation and auth over the query engine and
//! aggregate cache.

pub mod auth;
pub mod routes;
pub mod server;

pub use server::ApiServer;

use std::sync::Arc;

use crate::cache::AggregateCache;
use crate::query::QueryEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
    pub cache: Arc<AggregateCache>,
}
