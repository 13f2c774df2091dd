use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engagement statistics for a single channel post
///
/// Constructed fresh per request from remote responses and never persisted.
/// `total_reactions` and `has_reactions` are derived in [`PostStats::assemble`]
/// so the invariants hold by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStats {
    pub success: bool,
    pub channel: String,
    pub channel_id: i64,
    pub channel_username: String,
    pub channel_name: Option<String>,
    pub channel_thumbnail_url: Option<String>,
    pub channel_subscribers: Option<u64>,
    pub message_id: i32,
    pub views: u64,
    pub reactions: BTreeMap<String, u64>,
    pub total_reactions: u64,
    pub comments: u64,
    pub reposts: u64,
    pub message_date: Option<DateTime<Utc>>,
    pub has_reactions: bool,
    pub post_photo_available: bool,
    pub post_photo_id: Option<String>,
}

/// Everything read off the fetched message itself (no extra remote call)
#[derive(Debug, Clone, Default)]
pub struct MessageSnapshot {
    pub views: u64,
    pub date: Option<DateTime<Utc>>,
    pub reactions: BTreeMap<String, u64>,
    pub photo_id: Option<String>,
}

/// Channel metadata, every field independently best-effort
#[derive(Debug, Clone, Default)]
pub struct ChannelInfo {
    pub name: Option<String>,
    pub username: Option<String>,
    pub subscribers: Option<u64>,
    pub thumbnail_url: Option<String>,
}

impl PostStats {
    /// Assemble the final record from the fetch pipeline's pieces
    ///
    /// Reactions with non-positive counts are dropped before the totals are
    /// derived.
    pub fn assemble(
        channel: &str,
        channel_id: i64,
        message_id: i32,
        message: MessageSnapshot,
        comments: u64,
        reposts: u64,
        info: ChannelInfo,
    ) -> Self {
        let reactions: BTreeMap<String, u64> = message
            .reactions
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();
        let total_reactions = reactions.values().sum();

        Self {
            success: true,
            channel: channel.to_string(),
            channel_id,
            channel_username: info.username.clone().unwrap_or_else(|| channel.to_string()),
            channel_name: info.name,
            channel_thumbnail_url: info.thumbnail_url,
            channel_subscribers: info.subscribers,
            message_id,
            views: message.views,
            has_reactions: !reactions.is_empty(),
            reactions,
            total_reactions,
            comments,
            reposts,
            message_date: message.date,
            post_photo_available: message.photo_id.is_some(),
            post_photo_id: message.photo_id,
        }
    }
}
