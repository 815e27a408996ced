//! Configuration loading, env substitution, and override handling.
//!
//! Config files: `copycat.toml`, `copycat.yaml`, or `copycat.json`
//! Searched in `./` then `~/.config/copycat/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, plus `COPYCAT_*`
//! environment overrides applied after load.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, find_or_default_config_path, load_config},
    schema::{CopycatConfig, TelegramConfig, TrackingConfig},
};
