//! Telegram session lifecycle
//!
//! Exactly one authenticated MTProto connection exists for the process
//! lifetime. It is established at startup, handed out as cheap client clones
//! per request, and torn down once at shutdown. The session artifact on disk
//! is produced out-of-band by the `session-init` binary; this module only
//! consumes it and refuses to run unauthorized.

use grammers_client::{Client, Config, InitParams};
use grammers_session::Session;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::TelegramConfig;
use crate::errors::AppError;

/// Owns the single long-lived grammers client
pub struct SessionManager {
    config: TelegramConfig,
    client: RwLock<Option<Client>>,
}

impl SessionManager {
    /// Validate credentials and prepare an unconnected manager
    ///
    /// Fails if the API credentials are absent: the process must refuse to
    /// start rather than run unauthenticated.
    pub fn new(config: TelegramConfig) -> Result<Self, AppError> {
        if config.api_id == 0 || config.api_hash.is_empty() {
            return Err(AppError::configuration(
                "TELEGRAM_API_ID or TELEGRAM_API_HASH not set",
            ));
        }

        Ok(Self {
            config,
            client: RwLock::new(None),
        })
    }

    /// Establish the network session if not already connected (idempotent)
    ///
    /// Returns a clonable client handle. Callers invoke this before every
    /// remote call sequence, which also restores a connection that was never
    /// established at startup.
    pub async fn connect(&self) -> Result<Client, AppError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut guard = self.client.write().await;
        // Another request may have connected while we waited for the lock
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let session = Session::load_file_or_create(&self.config.session_path)
            .map_err(|e| AppError::session(format!("failed to load session file: {e}")))?;

        // Surface flood waits to the caller instead of sleeping them off
        let mut params = InitParams::default();
        params.flood_sleep_threshold = 0;

        let client = Client::connect(Config {
            session,
            api_id: self.config.api_id,
            api_hash: self.config.api_hash.clone(),
            params,
        })
        .await
        .map_err(|e| AppError::session(format!("failed to connect to Telegram: {e}")))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| AppError::session(format!("authorization check failed: {e}")))?;
        if !authorized {
            return Err(AppError::session(
                "session is not authorized; run the session-init tool first",
            ));
        }

        info!("Connected to Telegram");
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Tear down the session, saving its state to disk (idempotent)
    pub async fn disconnect(&self) {
        let mut guard = self.client.write().await;
        if let Some(client) = guard.take() {
            if let Err(e) = client.session().save_to_file(&self.config.session_path) {
                tracing::warn!("Failed to save session file: {}", e);
            }
            info!("Disconnected from Telegram");
        }
    }
}
