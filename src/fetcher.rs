//! Stats fetch pipeline
//!
//! Orchestrates the per-request sequence of remote calls: resolve the channel
//! and fetch the message (both mandatory), then gather comment count, repost
//! count and channel metadata as independently best-effort sub-fetches. A
//! failed sub-fetch degrades to its default value with a warning instead of
//! aborting the request, since those numbers are secondary to the mandatory
//! views and reactions.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::FetchError;
use crate::models::PostStats;
use crate::telegram::TelegramApi;
use crate::url_parser::parse_post_url;

/// Assembles [`PostStats`] from a sequence of remote calls
pub struct StatsFetcher {
    api: Arc<dyn TelegramApi>,
}

impl StatsFetcher {
    pub fn new(api: Arc<dyn TelegramApi>) -> Self {
        Self { api }
    }

    /// Parse a post URL and fetch its statistics
    pub async fn fetch_url(&self, url: &str) -> Result<PostStats, FetchError> {
        let (channel, message_id) = parse_post_url(url)?;
        self.fetch(&channel, message_id).await
    }

    /// Fetch statistics for `(channel, message_id)`
    pub async fn fetch(&self, channel: &str, message_id: i32) -> Result<PostStats, FetchError> {
        let channel_ref = self.api.resolve_channel(channel).await?;
        let message = self.api.fetch_message(&channel_ref, message_id).await?;

        let comments = best_effort(
            "comment count",
            0,
            self.api.fetch_comment_count(&channel_ref, message_id),
        )
        .await;
        let reposts = best_effort(
            "repost count",
            0,
            self.api.fetch_forward_count(&channel_ref, message_id),
        )
        .await;
        // Name, username and thumbnail are already known from resolution;
        // only the subscriber count needs (and may lose) another remote call
        let mut info = channel_ref.info();
        info.subscribers = best_effort(
            "subscriber count",
            None,
            self.api.fetch_subscriber_count(&channel_ref),
        )
        .await;

        info!("Successfully parsed post: {}/{}", channel, message_id);

        Ok(PostStats::assemble(
            channel,
            channel_ref.id,
            message_id,
            message,
            comments,
            reposts,
            info,
        ))
    }
}

/// Run one best-effort sub-fetch, substituting `default` on failure
///
/// The fail-open policy is explicit at every call site: the returned value is
/// always usable and the failure is only visible in the logs.
async fn best_effort<T, F>(what: &str, default: T, operation: F) -> T
where
    F: Future<Output = Result<T, FetchError>>,
{
    match operation.await {
        Ok(value) => value,
        Err(e) => {
            warn!("Best-effort fetch of {} failed, using default: {}", what, e);
            default
        }
    }
}
