use teloxide::types::{Message, MessageKind, UserId as TgUserId};

use copycat_common::{ChatId, MessageEvent, MessageId, UserId};

/// Reduce a Telegram message to the fields routing matches on.
///
/// `outgoing` means the sender is the connected account itself; the Bot API
/// never echoes the bot's own sends through `getUpdates`, but messages can
/// still arrive via other clients of the same account on self-hosted servers,
/// so the check stays explicit.
#[must_use]
pub fn map_message(message: &Message, self_id: TgUserId) -> MessageEvent {
    let sender = message.from.as_ref().map(|user| UserId(user.id.0));
    MessageEvent {
        chat: ChatId(message.chat.id.0),
        message_id: MessageId(message.id.0),
        sender,
        outgoing: sender == Some(UserId(self_id.0)),
        text: message.text().map(ToString::to_string),
        topic_title: topic_title(message),
    }
}

/// Title of the forum topic the message was posted into, if any.
///
/// Telegram attaches the thread root as the reply target of every message
/// posted directly into a topic; the root is the `forum_topic_created`
/// service message carrying the title. Replies within a topic point at the
/// replied message instead and carry no recoverable title.
fn topic_title(message: &Message) -> Option<String> {
    if !message.is_topic_message {
        return None;
    }
    let root = message.reply_to_message()?;
    match &root.kind {
        MessageKind::ForumTopicCreated(created) => {
            Some(created.forum_topic_created.name.clone())
        },
        _ => None,
    }
}
