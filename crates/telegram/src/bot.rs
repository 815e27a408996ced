use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, Bot, RequestError,
        prelude::*,
        types::{AllowedUpdate, Me, UpdateKind},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    copycat_common::{MessageHandler, UserId},
    copycat_config::TelegramConfig,
};

use crate::{
    error::{Error, Result},
    event,
    outbound::TelegramOutbound,
};

/// A verified bot connection.
pub struct TelegramConnection {
    bot: Bot,
    me: Me,
}

impl TelegramConnection {
    /// Verify the credentials and clear any webhook so long polling works.
    pub async fn connect(config: &TelegramConfig) -> Result<Self> {
        // Client timeout longer than the long-polling timeout (30s) so the
        // HTTP client doesn't abort the request before Telegram responds.
        // teloxide pins its own reqwest, so its builder error is mapped by
        // hand rather than through the crate's reqwest From impl.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(std::time::Duration::from_secs(45))
            .build()
            .map_err(|e| Error::api("http client", e.to_string()))?;
        let mut bot = Bot::with_client(config.token.expose_secret(), client);
        if let Some(base) = &config.api_base {
            let url =
                reqwest::Url::parse(base).map_err(|e| Error::api("api_base", e.to_string()))?;
            bot = bot.set_api_url(url);
        }

        let me = bot.get_me().await?;
        bot.delete_webhook().send().await?;
        info!(username = ?me.username, "telegram bot connected (webhook cleared)");

        Ok(Self { bot, me })
    }

    /// Id of the connected account.
    #[must_use]
    pub fn self_id(&self) -> UserId {
        UserId(self.me.id.0)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.me.username.as_deref()
    }

    /// Outbound sender sharing this connection.
    #[must_use]
    pub fn outbound(&self) -> TelegramOutbound {
        TelegramOutbound::new(self.bot.clone())
    }

    /// Start the manual `getUpdates` long-poll loop in a background task.
    ///
    /// Each message update is mapped to an event and handed to `handler` in
    /// its own task, so one slow handler never stalls the poll. The loop runs
    /// until the returned token is cancelled, or cancels itself when another
    /// instance takes over the token's update stream.
    #[must_use]
    pub fn start_polling(self, handler: Arc<dyn MessageHandler>) -> CancellationToken {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let bot = self.bot;
        let self_id = self.me.id;

        tokio::spawn(async move {
            info!("starting telegram polling loop");
            let mut offset: i32 = 0;

            loop {
                if token.is_cancelled() {
                    info!("telegram polling stopped");
                    break;
                }

                let result = bot
                    .get_updates()
                    .offset(offset)
                    .timeout(30)
                    .allowed_updates(vec![AllowedUpdate::Message])
                    .await;

                match result {
                    Ok(updates) => {
                        debug!(count = updates.len(), "got telegram updates");
                        for update in updates {
                            offset = update.id.as_offset();
                            match update.kind {
                                UpdateKind::Message(message) => {
                                    debug!(
                                        chat_id = message.chat.id.0,
                                        "received telegram message"
                                    );
                                    let event = event::map_message(&message, self_id);
                                    let handler = Arc::clone(&handler);
                                    tokio::spawn(async move {
                                        handler.on_message(event).await;
                                    });
                                },
                                other => {
                                    debug!("ignoring non-message update: {other:?}");
                                },
                            }
                        }
                    },
                    Err(e) => {
                        if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                            warn!(
                                "telegram polling stopped: another instance is running with this token"
                            );
                            token.cancel();
                            break;
                        }
                        warn!(error = %e, "telegram getUpdates failed");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    },
                }
            }
        });

        cancel
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        axum::{Json, Router, http::Uri},
        secrecy::Secret,
        serde_json::{Value, json},
    };

    use super::*;

    /// Answers `getMe` and acknowledges everything else.
    async fn serve(uri: Uri, _body: String) -> Json<Value> {
        let method = uri.path().rsplit('/').next().unwrap_or_default();
        let result = if method.eq_ignore_ascii_case("getMe") {
            json!({
                "id": 1000,
                "is_bot": true,
                "first_name": "copycat",
                "username": "copycat_bot",
                "can_join_groups": true,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false,
            })
        } else {
            json!(true)
        };
        Json(json!({ "ok": true, "result": result }))
    }

    #[tokio::test]
    async fn connect_verifies_credentials_and_exposes_identity() {
        let app = Router::new().fallback(serve);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = TelegramConfig {
            token: Secret::new("123:TEST".to_string()),
            api_base: Some(format!("http://{addr}")),
            ..Default::default()
        };

        let connection = TelegramConnection::connect(&config).await.unwrap();
        assert_eq!(connection.self_id(), UserId(1000));
        assert_eq!(connection.username(), Some("copycat_bot"));
    }

    #[tokio::test]
    async fn connect_rejects_a_malformed_api_base() {
        let config = TelegramConfig {
            token: Secret::new("123:TEST".to_string()),
            api_base: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(TelegramConnection::connect(&config).await.is_err());
    }
}
