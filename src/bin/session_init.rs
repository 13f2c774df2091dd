//! One-time interactive session bootstrap
//!
//! Exchanges phone number, verification code and (optionally) the 2FA
//! password for a persisted Telegram session file. The API service never
//! performs this flow itself; it only consumes the file written here.

use anyhow::{bail, Context, Result};
use clap::Parser;
use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::Session;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "session-init")]
#[command(version = "1.0.0")]
#[command(about = "Authenticate once and write the Telegram session file")]
struct Cli {
    /// Where to write the session file
    #[arg(short, long, default_value = "./data/telegram.session")]
    session_file: PathBuf,
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn env_or_prompt(var: &str, label: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => prompt(label),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let api_id: i32 = env_or_prompt("TELEGRAM_API_ID", "Enter your Telegram API ID: ")?
        .parse()
        .context("API ID must be a number")?;
    let api_hash = env_or_prompt("TELEGRAM_API_HASH", "Enter your Telegram API Hash: ")?;

    if let Some(parent) = cli.session_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let client = Client::connect(Config {
        session: Session::load_file_or_create(&cli.session_file)?,
        api_id,
        api_hash,
        params: InitParams::default(),
    })
    .await
    .context("failed to connect to Telegram")?;

    if client.is_authorized().await? {
        println!("Session is already authorized, nothing to do.");
    } else {
        println!("\n=== Authorization Required ===");
        let phone = prompt("Enter your phone number (with country code, e.g. +1234567890): ")?;
        let token = client
            .request_login_code(&phone)
            .await
            .context("failed to request login code")?;

        let code = prompt("Enter the verification code: ")?;
        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt("Enter your 2FA password: ")?;
                client
                    .check_password(password_token, password)
                    .await
                    .context("2FA password rejected")?;
            }
            Err(e) => bail!("sign-in failed: {e}"),
        }
    }

    client
        .session()
        .save_to_file(&cli.session_file)
        .context("failed to save session file")?;

    println!("\nSession initialized successfully.");
    println!("Session file saved to: {}", cli.session_file.display());
    println!("This file will be used by the API service. Keep it secure!");

    Ok(())
}
