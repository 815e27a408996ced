use {
    futures::future::join_all,
    tracing::{debug, warn},
};

use copycat_common::{ChannelRef, ChatDirectory, ChatId, ChatInfo, ForumTopic, TopicCursor};

/// Topics requested per page. The platform caps topic pages at 100 entries.
pub const TOPIC_PAGE_SIZE: usize = 100;

/// Topic listing of one forum, joined back to the chat list by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedForum {
    /// Id of the chat the forum was matched to, when the title join found one.
    pub chat_id: Option<ChatId>,
    /// Topic titles, in listing order.
    pub topics: Vec<String>,
}

impl ResolvedForum {
    fn empty() -> Self {
        Self {
            chat_id: None,
            topics: Vec::new(),
        }
    }
}

/// Fetch every topic of `channel`, page by page.
///
/// The cursor for each call is taken from the last topic of the previous
/// page. Termination relies on the server closing the listing with an empty
/// page; there is no iteration cap.
pub async fn fetch_all_topics(
    directory: &dyn ChatDirectory,
    channel: &ChannelRef,
) -> anyhow::Result<Vec<ForumTopic>> {
    let mut topics: Vec<ForumTopic> = Vec::new();
    let mut cursor = TopicCursor::default();

    loop {
        let page = directory
            .forum_topics(channel, cursor, TOPIC_PAGE_SIZE)
            .await?;
        let Some(last) = page.last() else {
            break;
        };
        cursor = TopicCursor::after(last);
        topics.extend(page);
    }

    Ok(topics)
}

/// Resolve one forum: list its topics and find its chat id by looking the
/// channel title up in `chats`. Any fetch error degrades the forum to an
/// unmatched, empty result; other forums are unaffected.
pub async fn resolve_forum(
    directory: &dyn ChatDirectory,
    chats: &[ChatInfo],
    channel: &ChannelRef,
) -> ResolvedForum {
    let topics = match fetch_all_topics(directory, channel).await {
        Ok(topics) => topics,
        Err(error) => {
            warn!(channel = %channel.title, %error, "failed to list forum topics");
            return ResolvedForum::empty();
        },
    };

    let chat_id = chats
        .iter()
        .find(|chat| chat.title == channel.title)
        .map(|chat| chat.id);
    if chat_id.is_none() {
        debug!(channel = %channel.title, "forum title matches no listed chat, topics dropped");
    }

    ResolvedForum {
        chat_id,
        topics: topics.into_iter().map(|topic| topic.title).collect(),
    }
}

/// Resolve every forum concurrently.
pub async fn resolve_forums(
    directory: &dyn ChatDirectory,
    chats: &[ChatInfo],
    channels: &[ChannelRef],
) -> Vec<ResolvedForum> {
    join_all(
        channels
            .iter()
            .map(|channel| resolve_forum(directory, chats, channel)),
    )
    .await
}
