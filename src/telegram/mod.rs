//! Telegram access layer
//!
//! The [`TelegramApi`] trait is the seam between the stats fetch pipeline and
//! the wire protocol: the production implementation talks MTProto through
//! grammers, tests substitute a mock. The session handle is constructed
//! explicitly at startup and injected, there is no global client.

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::models::{ChannelInfo, MessageSnapshot};

pub mod client;
pub mod session;

pub use client::GrammersApi;
pub use session::SessionManager;

/// Stable reference to a resolved broadcast channel
///
/// Carries enough to re-address the channel on subsequent RPCs without
/// resolving the username again.
#[derive(Debug, Clone)]
pub struct ChannelRef {
    pub id: i64,
    pub access_hash: Option<i64>,
    pub username: String,
    pub title: String,
}

impl ChannelRef {
    /// Channel metadata known locally from resolution, no remote call
    ///
    /// The subscriber count is the only field that needs another RPC; it
    /// starts absent and is filled in best-effort by the fetcher. The
    /// thumbnail is the public widget avatar, derived from the username
    /// (MTProto photos have no stable URL).
    pub fn info(&self) -> ChannelInfo {
        ChannelInfo {
            name: Some(self.title.clone()),
            username: Some(self.username.clone()),
            subscribers: None,
            thumbnail_url: Some(format!("https://t.me/i/userpic/320/{}.jpg", self.username)),
        }
    }
}

/// Read-only view of the remote messaging platform
///
/// Each method is one remote sub-step of the fetch sequence. The fetcher
/// decides which are mandatory and which degrade to defaults.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    /// Resolve a channel username to a stable channel reference (mandatory)
    async fn resolve_channel(&self, username: &str) -> Result<ChannelRef, FetchError>;

    /// Fetch a message and read views/date/reactions/photo off it (mandatory)
    async fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<MessageSnapshot, FetchError>;

    /// Fetch the comment (reply thread) count for a message (best-effort)
    async fn fetch_comment_count(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<u64, FetchError>;

    /// Fetch the forward/repost count for a message (best-effort)
    async fn fetch_forward_count(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<u64, FetchError>;

    /// Fetch the channel's subscriber count (best-effort)
    async fn fetch_subscriber_count(&self, channel: &ChannelRef)
        -> Result<Option<u64>, FetchError>;
}
