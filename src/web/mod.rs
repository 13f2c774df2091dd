//! Web layer module
//!
//! HTTP interface for the Telegram parser service: a health probe, the single
//! `/parse` endpoint, the access-filter middleware and the error response
//! mapping. Handlers stay thin and delegate to the fetch pipeline.

use anyhow::Result;
use axum::{middleware as axum_middleware, routing::get, Router};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::fetcher::StatsFetcher;
use crate::telegram::TelegramApi;

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::ErrorResponse;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, api: Arc<dyn TelegramApi>) -> Result<Self> {
        let state = AppState::new(&config.access.allowed_ips, api)?;
        let app = router(state);
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Create the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/parse", get(handlers::parse_post))
        // Middleware (applied in reverse order): the access filter is added
        // last so it runs outermost, ahead of CORS preflight handling
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::access_filter,
        ))
        .with_state(state)
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<StatsFetcher>,
    pub allowed_ips: Arc<HashSet<IpAddr>>,
}

impl AppState {
    /// Build shared state, validating allowlist entries up front
    pub fn new(allowed_ips: &[String], api: Arc<dyn TelegramApi>) -> Result<Self> {
        let allowed_ips = allowed_ips
            .iter()
            .map(|ip| {
                ip.parse::<IpAddr>()
                    .map_err(|_| anyhow::anyhow!("invalid address in allowlist: {ip}"))
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(Self {
            fetcher: Arc::new(StatsFetcher::new(api)),
            allowed_ips: Arc::new(allowed_ips),
        })
    }
}
