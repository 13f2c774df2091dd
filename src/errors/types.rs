//! Error type definitions for the Telegram parser service
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing credentials, bad config file, ...)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Telegram session lifecycle errors
    #[error("Session error: {message}")]
    Session { message: String },

    /// Errors raised while fetching post statistics
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors surfaced by the stats fetch pipeline
///
/// Only the mandatory steps (URL parsing, channel resolution, message fetch)
/// produce these; best-effort sub-fetches degrade to defaults instead.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The input string does not look like a Telegram post URL
    #[error("Invalid Telegram URL format: {url}")]
    InvalidUrl { url: String },

    /// The channel username does not resolve to a broadcast channel
    #[error("Channel {channel} not found")]
    ChannelNotFound { channel: String },

    /// The channel exists but is private or otherwise inaccessible
    #[error("Channel {channel} is private or inaccessible")]
    ChannelPrivate { channel: String },

    /// The channel has blocked the account behind the session
    #[error("Channel {channel} has blocked this account")]
    ChannelBlocked { channel: String },

    /// The message id does not exist in the channel
    #[error("Post not found: {channel}/{message_id}")]
    PostNotFound { channel: String, message_id: i32 },

    /// Telegram is throttling the session; the hint is in seconds
    #[error("Rate limited. Try again in {retry_after} seconds")]
    RateLimited { retry_after: u32 },

    /// Anything unclassified; detail is logged server-side only
    #[error("Failed to parse post: {message}")]
    Unknown { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a session error
    pub fn session<S: Into<String>>(message: S) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Create an invalid URL error
    pub fn invalid_url<U: Into<String>>(url: U) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Create a channel not found error
    pub fn channel_not_found<C: Into<String>>(channel: C) -> Self {
        Self::ChannelNotFound {
            channel: channel.into(),
        }
    }

    /// Create an unknown error
    pub fn unknown<M: Into<String>>(message: M) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Machine-readable code used in HTTP error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::ChannelNotFound { .. } => "CHANNEL_NOT_FOUND",
            Self::ChannelPrivate { .. } => "CHANNEL_PRIVATE",
            Self::ChannelBlocked { .. } => "CHANNEL_BLOCKED",
            Self::PostNotFound { .. } => "POST_NOT_FOUND",
            Self::RateLimited { .. } => "TELEGRAM_RATE_LIMIT",
            Self::Unknown { .. } => "INTERNAL_ERROR",
        }
    }
}
