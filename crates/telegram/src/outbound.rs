use {
    anyhow::Result,
    async_trait::async_trait,
    teloxide::{
        Bot,
        prelude::*,
        types::{ChatId as TgChatId, MessageId as TgMessageId},
    },
    tracing::debug,
};

use copycat_common::{ChatId, MessageId, Outbound};

/// Outbound sender over one bot connection.
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        debug!(chat = chat.0, "sending telegram message");
        self.bot.send_message(TgChatId(chat.0), text).await?;
        Ok(())
    }

    /// copyMessage rather than forwardMessage: the copy carries the content
    /// without the forwarded-from attribution header.
    async fn forward_message(&self, from: ChatId, to: ChatId, message: MessageId) -> Result<()> {
        debug!(
            from = from.0,
            to = to.0,
            message = message.0,
            "copying telegram message"
        );
        self.bot
            .copy_message(TgChatId(to.0), TgChatId(from.0), TgMessageId(message.0))
            .await?;
        Ok(())
    }
}
