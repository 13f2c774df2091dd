use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telegram_parser::{
    config::Config,
    telegram::{GrammersApi, SessionManager},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "telegram-parser")]
#[command(version = "1.0.0")]
#[command(about = "Parse Telegram channel posts to extract views and reactions")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("telegram_parser={},tower_http=trace", cli.log_level)
    } else {
        format!("telegram_parser={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Telegram Parser API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    if !config.access.allowed_ips.is_empty() {
        info!("IP allowlist enabled: {:?}", config.access.allowed_ips);
    }

    // Establish the single long-lived Telegram session
    let session = Arc::new(SessionManager::new(config.telegram.clone())?);
    session.connect().await?;

    let api = Arc::new(GrammersApi::new(session.clone()));
    let web_server = WebServer::new(&config, api)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve(shutdown_signal()).await?;

    // Teardown once, at process exit
    session.disconnect().await;
    info!("Telegram Parser API shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
