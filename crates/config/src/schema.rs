use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CopycatConfig {
    pub telegram: TelegramConfig,
    pub tracking: TrackingConfig,
}

/// Transport credentials and directory scope.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Account allowed to toggle output destinations. Defaults to the
    /// connected account itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u64>,

    /// Chat ids the directory queries the platform about. The Bot API has no
    /// dialog listing, so the set of visible chats is declared here.
    pub chats: Vec<i64>,

    /// Base URL override for self-hosted Bot API servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("chats", &self.chats)
            .finish_non_exhaustive()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            owner_id: None,
            chats: Vec::new(),
            api_base: None,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Tracking and toggle behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackingConfig {
    /// In-band toggle command, matched case-insensitively against the whole
    /// message text.
    pub command: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            command: "/copycat".to_string(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = CopycatConfig::default();
        assert_eq!(cfg.tracking.command, "/copycat");
        assert!(cfg.telegram.chats.is_empty());
        assert!(cfg.telegram.owner_id.is_none());
        assert!(cfg.telegram.api_base.is_none());
        assert_eq!(cfg.telegram.token.expose_secret(), "");
    }

    #[test]
    fn deserialize_from_toml() {
        let toml = r#"
            [telegram]
            token = "123:ABC"
            owner_id = 377114917
            chats = [-1001, -1002]

            [tracking]
            command = "/mirror"
        "#;
        let cfg: CopycatConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.telegram.token.expose_secret(), "123:ABC");
        assert_eq!(cfg.telegram.owner_id, Some(377_114_917));
        assert_eq!(cfg.telegram.chats, vec![-1001, -1002]);
        assert_eq!(cfg.tracking.command, "/mirror");
    }

    #[test]
    fn deserialize_partial_uses_defaults() {
        let json = r#"{ "telegram": { "token": "123:ABC" } }"#;
        let cfg: CopycatConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.telegram.token.expose_secret(), "123:ABC");
        assert_eq!(cfg.tracking.command, "/copycat");
        assert!(cfg.telegram.chats.is_empty());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = CopycatConfig {
            telegram: TelegramConfig {
                token: Secret::new("123:SECRET".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("123:SECRET"));
    }

    #[test]
    fn serialize_roundtrip() {
        let cfg = CopycatConfig {
            telegram: TelegramConfig {
                token: Secret::new("tok".into()),
                chats: vec![-42],
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: CopycatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg2.telegram.token.expose_secret(), "tok");
        assert_eq!(cfg2.telegram.chats, vec![-42]);
    }
}
