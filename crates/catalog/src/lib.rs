//! Builds the selectable chat universe for one run: forum topics are
//! enumerated page by page, joined back to the chat list, and merged with
//! plain chats into a flat catalog.

pub mod builder;
pub mod resolver;

pub use {
    builder::{CatalogEntry, ChatCatalog, build_catalog, selectable_chats},
    resolver::{ResolvedForum, TOPIC_PAGE_SIZE, resolve_forums},
};
