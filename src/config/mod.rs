use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub telegram: TelegramConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Telegram connection settings
///
/// The session file path comes from the config file; the API credentials are
/// secrets and are only ever read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub session_path: PathBuf,
    #[serde(skip)]
    pub api_id: i32,
    #[serde(skip)]
    pub api_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Caller addresses allowed to use the API; empty allows everyone
    pub allowed_ips: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            telegram: TelegramConfig {
                session_path: PathBuf::from("./data/telegram.session"),
                api_id: 0,
                api_hash: String::new(),
            },
            access: AccessConfig {
                allowed_ips: Vec::new(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Self = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::create_dir_all("./data")?;
            std::fs::write(&config_file, contents)?;
            default_config
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Pull secrets and overrides from the environment
    ///
    /// `TELEGRAM_API_ID` and `TELEGRAM_API_HASH` are required; the process
    /// refuses to start unauthenticated. `ALLOWED_IPS` (comma-separated)
    /// replaces the allowlist from the config file when set.
    fn apply_env(&mut self) -> Result<()> {
        let api_id = std::env::var("TELEGRAM_API_ID")
            .context("TELEGRAM_API_ID not set")?;
        self.telegram.api_id = api_id
            .trim()
            .parse()
            .context("TELEGRAM_API_ID is not a number")?;
        self.telegram.api_hash =
            std::env::var("TELEGRAM_API_HASH").context("TELEGRAM_API_HASH not set")?;

        if let Ok(allowed) = std::env::var("ALLOWED_IPS") {
            self.access.allowed_ips = allowed
                .split(',')
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
                .collect();
        }

        Ok(())
    }
}
