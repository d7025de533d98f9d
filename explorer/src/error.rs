//! Error taxonomy and the JSON envelope served to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use rpc_core::RpcError;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("node error: {0}")]
    Rpc(RpcError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Input(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("temporarily unavailable: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl From<RpcError> for ExplorerError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Timeout | RpcError::Network(_) => Self::Transient(err.to_string()),
            other => Self::Rpc(other),
        }
    }
}

impl From<chain_core::ChainError> for ExplorerError {
    fn from(err: chain_core::ChainError) -> Self {
        Self::Input(err.to_string())
    }
}

impl ExplorerError {
    fn kind(&self) -> (&'static str, StatusCode) {
        match self {
            Self::Input(_) => ("InvalidInput", StatusCode::BAD_REQUEST),
            Self::NotFound(_) => ("NotFound", StatusCode::NOT_FOUND),
            Self::Transient(_) => ("Unavailable", StatusCode::SERVICE_UNAVAILABLE),
            Self::Database(_) | Self::Rpc(_) | Self::Serialization(_) | Self::Io(_)
            | Self::Internal(_) => ("InternalError", StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Message safe to show to clients. Internal failures keep their detail in
    /// the logs only.
    fn public_message(&self) -> String {
        match self {
            Self::Input(_) | Self::NotFound(_) | Self::Transient(_) => self.to_string(),
            _ => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let (kind, status) = self.kind();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }

        let body = Json(json!({
            "error": {
                "type": kind,
                "code": status.as_u16(),
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status() {
        assert_eq!(
            ExplorerError::Input("bad limit".into()).kind().1,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExplorerError::NotFound("block").kind().1,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ExplorerError::Transient("timeout".into()).kind().1,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ExplorerError::Internal("bug".into()).kind().1,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ExplorerError::Internal("/var/lib/secret".into());
        assert_eq!(err.public_message(), "internal error");
    }

    #[test]
    fn transient_from_rpc_timeout() {
        let err: ExplorerError = RpcError::Timeout.into();
        assert!(matches!(err, ExplorerError::Transient(_)));
    }
}
