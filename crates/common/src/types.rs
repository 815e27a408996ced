use serde::{Deserialize, Serialize};

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Platform chat identifier (negative for groups and channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Platform user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Message identifier, unique within its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Route keys ──────────────────────────────────────────────────────────────

/// Addressable identity of anything trackable: a whole chat, or a single
/// forum topic within one.
///
/// Keys compare structurally, so a `/` inside a topic title cannot collide
/// with the rendered `chat/title` label. Topic titles are assumed unique
/// within their chat; the platform join offers nothing stronger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKey {
    /// A whole chat, forum or not.
    Plain(ChatId),
    /// One topic thread inside a forum chat, identified by its title.
    Topic { chat: ChatId, title: String },
}

impl RouteKey {
    #[must_use]
    pub fn topic(chat: ChatId, title: impl Into<String>) -> Self {
        Self::Topic {
            chat,
            title: title.into(),
        }
    }

    /// The chat the key lives in, regardless of topic qualification.
    #[must_use]
    pub fn chat(&self) -> ChatId {
        match self {
            Self::Plain(chat) => *chat,
            Self::Topic { chat, .. } => *chat,
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(chat) => write!(f, "{chat}"),
            Self::Topic { chat, title } => write!(f, "{chat}/{title}"),
        }
    }
}

// ── Directory shapes ────────────────────────────────────────────────────────

/// Chat classification as seen by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// One-to-one conversation.
    Private,
    /// Basic group or supergroup.
    Group,
    /// Broadcast or forum channel.
    Channel,
}

/// One chat as listed by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: ChatId,
    pub kind: ChatKind,
    pub title: String,
}

impl ChatInfo {
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }
}

/// Opaque reference to a forum-capable channel, handed back verbatim to
/// topic fetches. `access_hash` is platform-specific and may be zero for
/// transports that address chats by id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: i64,
    pub access_hash: i64,
    pub title: String,
}

/// One forum topic as returned by a paginated topic fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumTopic {
    /// Message id of the topic's root message, part of the page cursor.
    pub id: i32,
    pub title: String,
    /// Creation date (unix seconds), part of the page cursor.
    pub date: i64,
    /// Thread id of the topic, part of the page cursor.
    pub topic_id: i32,
}

/// Pagination cursor for topic fetches. The zero value addresses the first
/// page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicCursor {
    pub offset_date: i64,
    pub offset_id: i32,
    pub offset_topic: i32,
}

impl TopicCursor {
    /// Cursor addressing the page that follows `topic`.
    #[must_use]
    pub fn after(topic: &ForumTopic) -> Self {
        Self {
            offset_date: topic.date,
            offset_id: topic.id,
            offset_topic: topic.topic_id,
        }
    }
}

// ── Message events ──────────────────────────────────────────────────────────

/// One inbound message, reduced to the fields routing cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub chat: ChatId,
    pub message_id: MessageId,
    /// Sender, when the platform exposes one (service messages may not).
    pub sender: Option<UserId>,
    /// True when the connected account itself sent the message.
    pub outgoing: bool,
    /// Plain text body, if any.
    pub text: Option<String>,
    /// Title of the forum topic the message belongs to, if any.
    pub topic_title: Option<String>,
}

impl MessageEvent {
    /// The key this message is matched under: topic-qualified when the
    /// message lives in a forum topic, the bare chat otherwise.
    #[must_use]
    pub fn route_key(&self) -> RouteKey {
        match &self.topic_title {
            Some(title) => RouteKey::Topic {
                chat: self.chat,
                title: title.clone(),
            },
            None => RouteKey::Plain(self.chat),
        }
    }
}
