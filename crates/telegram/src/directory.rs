use {
    anyhow::bail,
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned},
    tracing::{debug, warn},
};

use {
    copycat_common::{ChannelRef, ChatDirectory, ChatId, ChatInfo, ChatKind, ForumTopic, TopicCursor},
    copycat_config::TelegramConfig,
};

use crate::error::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Chat directory over the raw Bot API.
///
/// The Bot API has no dialog listing, so the visible universe is the set of
/// configured chat ids; `getChat` supplies title, kind, and forum capability
/// for each. Topic listing is not part of the Bot API surface at all: an
/// MTProto-backed [`ChatDirectory`] is needed for that, and this one reports
/// the gap as a per-channel error.
pub struct BotApiDirectory {
    http: reqwest::Client,
    token: Secret<String>,
    base: String,
    chats: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// `getChat` result, reduced to the fields the directory reads.
#[derive(Debug, Deserialize)]
struct ChatPayload {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    is_forum: Option<bool>,
}

impl BotApiDirectory {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let base = config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            http,
            token: config.token.clone(),
            base,
            chats: config.chats.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let url = format!("{}/bot{}/{method}", self.base, self.token.expose_secret());
        let response: ApiResponse<T> = self.http.post(&url).json(&params).send().await?.json().await?;
        if !response.ok {
            return Err(Error::api(
                method,
                response
                    .description
                    .unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        response
            .result
            .ok_or_else(|| Error::api(method, "response carries no result"))
    }

    async fn get_chat(&self, id: i64) -> Result<ChatPayload> {
        self.call("getChat", serde_json::json!({ "chat_id": id })).await
    }

    /// `getChat` every configured id, dropping the ones the bot cannot see.
    async fn visible_chats(&self) -> Vec<ChatPayload> {
        let mut chats = Vec::with_capacity(self.chats.len());
        for &id in &self.chats {
            match self.get_chat(id).await {
                Ok(chat) => chats.push(chat),
                Err(error) => warn!(chat = id, %error, "getChat failed, chat skipped"),
            }
        }
        chats
    }
}

fn chat_kind(kind: &str) -> ChatKind {
    match kind {
        "private" => ChatKind::Private,
        "channel" => ChatKind::Channel,
        // "group" and "supergroup"; anything new from the platform is
        // treated as a group, the least privileged selectable kind.
        _ => ChatKind::Group,
    }
}

fn chat_title(chat: &ChatPayload) -> String {
    chat.title
        .clone()
        .or_else(|| chat.first_name.clone())
        .unwrap_or_else(|| chat.id.to_string())
}

#[async_trait]
impl ChatDirectory for BotApiDirectory {
    async fn list_chats(&self) -> anyhow::Result<Vec<ChatInfo>> {
        let chats = self.visible_chats().await;
        debug!(configured = self.chats.len(), visible = chats.len(), "listed chats");
        Ok(chats
            .into_iter()
            .map(|chat| ChatInfo {
                id: ChatId(chat.id),
                kind: chat_kind(&chat.kind),
                title: chat_title(&chat),
            })
            .collect())
    }

    async fn list_forum_channels(&self) -> anyhow::Result<Vec<ChannelRef>> {
        Ok(self
            .visible_chats()
            .await
            .into_iter()
            .filter(|chat| chat.is_forum == Some(true))
            .map(|chat| ChannelRef {
                id: chat.id,
                // The Bot API addresses chats by id alone.
                access_hash: 0,
                title: chat_title(&chat),
            })
            .collect())
    }

    async fn forum_topics(
        &self,
        channel: &ChannelRef,
        _cursor: TopicCursor,
        _limit: usize,
    ) -> anyhow::Result<Vec<ForumTopic>> {
        bail!(
            "the Bot API cannot enumerate forum topics of {}; an MTProto-backed directory is required",
            channel.title
        );
    }
}
