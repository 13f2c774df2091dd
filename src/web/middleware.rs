//! Request logging and IP allowlist middleware
//!
//! Every request is logged with the caller address, method and path. When the
//! allowlist is non-empty, callers outside it are rejected with 403 before any
//! other processing.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use std::net::SocketAddr;
use tracing::{info, warn};

use super::AppState;
use crate::web::responses::ErrorResponse;

pub async fn access_filter(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let caller = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let caller_label = caller
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!(
        "Request from {}: {} {}",
        caller_label,
        request.method(),
        request.uri().path()
    );

    if !state.allowed_ips.is_empty() {
        let allowed = caller.map(|ip| state.allowed_ips.contains(&ip)).unwrap_or(false);
        if !allowed {
            warn!("Access denied for IP: {}", caller_label);
            let body = ErrorResponse::new("Access denied", "FORBIDDEN");
            return (StatusCode::FORBIDDEN, Json(body)).into_response();
        }
    }

    next.run(request).await
}
