//! Telegram transport: connection and polling loop, inbound event mapping,
//! outbound sender, and a Bot-API-backed chat directory.

pub mod bot;
pub mod directory;
pub mod error;
pub mod event;
pub mod outbound;

pub use {
    bot::TelegramConnection,
    directory::BotApiDirectory,
    error::{Error, Result},
    outbound::TelegramOutbound,
};
