//! API server assembly and lifecycle.

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::{auth, routes, AppState};
use crate::cache::AggregateCache;
use crate::config::Config;
use crate::error::{ExplorerError, Result};
use crate::query::QueryEngine;

pub struct ApiServer {
    state: AppState,
    config: Config,
}

impl ApiServer {
    pub fn new(engine: Arc<QueryEngine>, cache: Arc<AggregateCache>, config: Config) -> Self {
        Self {
            state: AppState { engine, cache },
            config,
        }
    }

    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::status::routes())
            .merge(routes::blocks::routes())
            .merge(routes::transactions::routes())
            .merge(routes::addresses::routes())
            .merge(routes::names::routes())
            .merge(routes::charts::routes())
            .merge(routes::pool::routes())
            .merge(routes::search::routes())
            .merge(routes::mempool::routes())
            .merge(routes::peers::routes())
            .with_state(self.state.clone());

        if self.config.auth_enabled() {
            if let Some(key) = self.config.http.api_key.clone() {
                router = router.layer(axum::middleware::from_fn_with_state(
                    key,
                    auth::require_basic_auth,
                ));
            }
        }

        if self.config.http.cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    pub async fn serve(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.http.host, self.config.http.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ExplorerError::Internal(format!("failed to bind {addr}: {e}")))?;

        info!("explorer API listening on {addr}");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ExplorerError::Internal(format!("server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("shutting down");
}
