//! HTTP Basic auth: any username, password must equal the configured API key.

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

pub async fn require_basic_auth(
    State(key): State<String>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if authorized(header, &key) {
        return next.run(request).await;
    }

    let body = Json(json!({
        "error": {
            "type": "Unauthorized",
            "code": 401,
            "message": "invalid API key",
        }
    }));
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, "Basic realm=\"explorer\"")],
        body,
    )
        .into_response()
}

fn authorized(header: Option<&str>, key: &str) -> bool {
    let Some(value) = header else {
        return false;
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let Ok(text) = String::from_utf8(decoded) else {
        return false;
    };
    match text.split_once(':') {
        Some((_, password)) => password == key,
        None => false,
    }
}
