//! HTTP request handlers
//!
//! Thin controllers: parameter extraction here, everything else in the fetch
//! pipeline.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::web::responses::ErrorResponse;

/// Liveness probe
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "telegram-parser"
    }))
}

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    /// Telegram post URL, e.g. `https://t.me/examplechan/99`
    pub url: String,
}

/// `GET /parse?url=...` — parse a channel post and return its statistics
pub async fn parse_post(
    State(state): State<AppState>,
    query: Option<Query<ParseQuery>>,
) -> Response {
    // A missing/unreadable query string gets the same structured body as
    // every other failure instead of the extractor's plain-text rejection
    let Some(Query(query)) = query else {
        let body = ErrorResponse::new("Missing required query parameter: url", "INVALID_URL");
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    match state.fetcher.fetch_url(&query.url).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}
