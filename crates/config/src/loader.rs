use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::CopycatConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["copycat.toml", "copycat.yaml", "copycat.yml", "copycat.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CopycatConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./copycat.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/copycat/copycat.{toml,yaml,yml,json}` (user-global)
///
/// A missing file yields `CopycatConfig::default()`; an unreadable or
/// unparsable file is an error so a typo cannot silently run with defaults.
pub fn discover_and_load() -> anyhow::Result<CopycatConfig> {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return Ok(CopycatConfig::default());
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path)
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/copycat/
    if let Some(dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// The user-global config directory (`~/.config/copycat/`).
fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "copycat").map(|d| d.config_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("copycat.toml")
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CopycatConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Apply `COPYCAT_*` environment overrides on top of a loaded config.
///
/// `COPYCAT_CHATS` replaces the configured chat list wholesale.
pub fn apply_env_overrides(config: &mut CopycatConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(
    config: &mut CopycatConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(token) = lookup("COPYCAT_TELEGRAM_TOKEN").or_else(|| lookup("TELEGRAM_BOT_TOKEN")) {
        config.telegram.token = Secret::new(token);
    }

    if let Some(raw) = lookup("COPYCAT_OWNER_ID") {
        match raw.parse() {
            Ok(id) => config.telegram.owner_id = Some(id),
            Err(_) => warn!(value = %raw, "COPYCAT_OWNER_ID is not a user id, ignoring"),
        }
    }

    if let Some(raw) = lookup("COPYCAT_CHATS") {
        let mut chats = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.parse::<i64>() {
                Ok(id) => chats.push(id),
                Err(_) => warn!(entry = part, "COPYCAT_CHATS entry is not a chat id, skipping"),
            }
        }
        config.telegram.chats = chats;
    }

    if let Some(command) = lookup("COPYCAT_COMMAND") {
        config.tracking.command = command;
    }

    if let Some(base) = lookup("COPYCAT_API_BASE") {
        config.telegram.api_base = Some(base);
    }
}
