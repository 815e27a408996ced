//! Shared types and client traits used across all copycat crates.

pub mod api;
pub mod types;

pub use {
    api::{ChatDirectory, MessageHandler, Outbound},
    types::{
        ChannelRef, ChatId, ChatInfo, ChatKind, ForumTopic, MessageEvent, MessageId, RouteKey,
        TopicCursor, UserId,
    },
};
