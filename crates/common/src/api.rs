use {anyhow::Result, async_trait::async_trait};

use crate::types::{ChannelRef, ChatId, ChatInfo, ForumTopic, MessageEvent, MessageId, TopicCursor};

/// Read-only view of the chats visible to the connected account. Concrete
/// implementations own the wire transport; pagination of the chat list itself
/// happens behind this trait, only topic pagination is driven by the caller.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// Every chat the account can see.
    async fn list_chats(&self) -> Result<Vec<ChatInfo>>;

    /// Forum-capable channels, as opaque references for topic fetches.
    async fn list_forum_channels(&self) -> Result<Vec<ChannelRef>>;

    /// One page of a channel's forum topics: at most `limit` entries starting
    /// after `cursor`. An empty page means the listing is exhausted.
    async fn forum_topics(
        &self,
        channel: &ChannelRef,
        cursor: TopicCursor,
        limit: usize,
    ) -> Result<Vec<ForumTopic>>;
}

/// Send messages back to the platform.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()>;

    /// Relay `message` from `from` into `to` without the forwarded-from
    /// attribution header.
    async fn forward_message(&self, from: ChatId, to: ChatId, message: MessageId) -> Result<()>;
}

/// Consumer of inbound messages. Called once per message by the polling
/// adapter; implementations contain their own failures, so delivery never
/// feeds an error back into the update stream.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, event: MessageEvent);
}
