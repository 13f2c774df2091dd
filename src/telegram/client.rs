//! Grammers-backed implementation of [`TelegramApi`]
//!
//! Thin adapter between the fetch pipeline and MTProto. Remote failures are
//! classified by the structured RPC error name rather than by matching on
//! message substrings, so each category maps deterministically onto the
//! [`FetchError`] taxonomy.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use grammers_client::types::{Chat, Message};
use grammers_client::{Client, InvocationError};
use grammers_session::{PackedChat, PackedType};
use grammers_tl_types as tl;

use super::{ChannelRef, SessionManager, TelegramApi};
use crate::errors::FetchError;
use crate::models::MessageSnapshot;

/// Production [`TelegramApi`] backed by a shared grammers client
pub struct GrammersApi {
    session: Arc<SessionManager>,
}

impl GrammersApi {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Obtain the shared client, connecting opportunistically if the session
    /// was never established at startup
    async fn client(&self) -> Result<Client, FetchError> {
        self.session
            .connect()
            .await
            .map_err(|e| FetchError::unknown(e.to_string()))
    }

    /// Fetch a single message by id, mapping absence to `PostNotFound`
    async fn message_by_id(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<Message, FetchError> {
        let client = self.client().await?;
        let mut messages = client
            .get_messages_by_id(packed(channel), &[message_id])
            .await
            .map_err(|e| classify(e, channel, Some(message_id)))?;

        match messages.pop().flatten() {
            Some(message) => Ok(message),
            None => Err(FetchError::PostNotFound {
                channel: channel.username.clone(),
                message_id,
            }),
        }
    }
}

#[async_trait]
impl TelegramApi for GrammersApi {
    async fn resolve_channel(&self, username: &str) -> Result<ChannelRef, FetchError> {
        let client = self.client().await?;
        let chat = client
            .resolve_username(username)
            .await
            .map_err(|e| classify_for_channel(e, username))?;

        match chat {
            Some(Chat::Channel(channel)) => {
                let packed = channel.pack();
                Ok(ChannelRef {
                    id: channel.id(),
                    access_hash: packed.access_hash,
                    username: channel
                        .username()
                        .unwrap_or(username)
                        .to_string(),
                    title: channel.title().to_string(),
                })
            }
            // Users and small group chats are not broadcast channels
            Some(_) | None => Err(FetchError::channel_not_found(username)),
        }
    }

    async fn fetch_message(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<MessageSnapshot, FetchError> {
        let message = self.message_by_id(channel, message_id).await?;

        Ok(MessageSnapshot {
            views: count(message.view_count()),
            date: Some(message.date()),
            reactions: reaction_counts(&message),
            photo_id: message.photo().map(|photo| photo.id().to_string()),
        })
    }

    async fn fetch_comment_count(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<u64, FetchError> {
        let message = self.message_by_id(channel, message_id).await?;
        Ok(count(message.reply_count()))
    }

    async fn fetch_forward_count(
        &self,
        channel: &ChannelRef,
        message_id: i32,
    ) -> Result<u64, FetchError> {
        let message = self.message_by_id(channel, message_id).await?;
        Ok(count(message.forward_count()))
    }

    async fn fetch_subscriber_count(
        &self,
        channel: &ChannelRef,
    ) -> Result<Option<u64>, FetchError> {
        let client = self.client().await?;
        let request = tl::functions::channels::GetFullChannel {
            channel: tl::enums::InputChannel::Channel(tl::types::InputChannel {
                channel_id: channel.id,
                access_hash: channel.access_hash.unwrap_or(0),
            }),
        };

        let tl::enums::messages::ChatFull::Full(full) = client
            .invoke(&request)
            .await
            .map_err(|e| classify(e, channel, None))?;

        Ok(match full.full_chat {
            tl::enums::ChatFull::ChannelFull(ref channel_full) => {
                channel_full.participants_count.map(|c| c.max(0) as u64)
            }
            _ => None,
        })
    }
}

fn packed(channel: &ChannelRef) -> PackedChat {
    PackedChat {
        ty: PackedType::Broadcast,
        id: channel.id,
        access_hash: channel.access_hash,
    }
}

fn count(value: Option<i32>) -> u64 {
    value.map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Aggregate reaction counts per emoji label, keeping only positive counts
///
/// Custom emoji reactions are keyed by their document id since they have no
/// textual label.
fn reaction_counts(message: &Message) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();

    let Some(tl::enums::MessageReactions::Reactions(ref reactions)) = message.raw.reactions
    else {
        return counts;
    };

    for result in &reactions.results {
        let tl::enums::ReactionCount::Count(ref reaction) = *result;
        if reaction.count <= 0 {
            continue;
        }
        let label = match &reaction.reaction {
            tl::enums::Reaction::Emoji(emoji) => emoji.emoticon.clone(),
            tl::enums::Reaction::CustomEmoji(custom) => custom.document_id.to_string(),
            _ => continue,
        };
        *counts.entry(label).or_insert(0) += reaction.count as u64;
    }

    counts
}

fn is_unknown_username(name: &str) -> bool {
    matches!(name, "USERNAME_NOT_OCCUPIED" | "USERNAME_INVALID")
}

/// Map a structured RPC failure onto the fetch error taxonomy
fn classify(err: InvocationError, channel: &ChannelRef, message_id: Option<i32>) -> FetchError {
    classify_parts(err, &channel.username, message_id)
}

fn classify_for_channel(err: InvocationError, username: &str) -> FetchError {
    classify_parts(err, username, None)
}

fn classify_parts(err: InvocationError, channel: &str, message_id: Option<i32>) -> FetchError {
    let rpc = match err {
        InvocationError::Rpc(rpc) => rpc,
        other => return FetchError::unknown(other.to_string()),
    };

    match rpc.name.as_str() {
        name if name.starts_with("FLOOD_WAIT") || name.starts_with("FLOOD_PREMIUM_WAIT") => {
            FetchError::RateLimited {
                retry_after: rpc.value.unwrap_or(0),
            }
        }
        "CHANNEL_PRIVATE" | "CHAT_FORBIDDEN" => FetchError::ChannelPrivate {
            channel: channel.to_string(),
        },
        "USER_BANNED_IN_CHANNEL" | "USER_IS_BLOCKED" => FetchError::ChannelBlocked {
            channel: channel.to_string(),
        },
        "MSG_ID_INVALID" => FetchError::PostNotFound {
            channel: channel.to_string(),
            message_id: message_id.unwrap_or(0),
        },
        name if is_unknown_username(name) || name == "CHANNEL_INVALID" => {
            FetchError::channel_not_found(channel)
        }
        _ => FetchError::unknown(rpc.to_string()),
    }
}
