use std::collections::HashSet;

use copycat_common::{ChatInfo, RouteKey};

use crate::resolver::ResolvedForum;

/// One selectable entry: the key routing matches on, plus its prompt label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: RouteKey,
    /// Topic title for topic entries, chat title for plain ones.
    pub label: String,
}

/// The selectable universe for one run. `topics` and `plain` are disjoint:
/// a plain chat whose `(id, title)` pair collides with a topic key is
/// excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCatalog {
    pub plain: Vec<CatalogEntry>,
    pub topics: Vec<CatalogEntry>,
}

impl ChatCatalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.plain.len() + self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.topics.is_empty()
    }

    /// Entries in prompt order: plain chats first, then topics.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.plain.iter().chain(self.topics.iter())
    }
}

/// Drop one-to-one private chats; everything else is selectable.
#[must_use]
pub fn selectable_chats(chats: Vec<ChatInfo>) -> Vec<ChatInfo> {
    chats.into_iter().filter(|chat| !chat.is_private()).collect()
}

/// Merge the chat list with the resolved forum topics.
///
/// Topic entries come first in resolution order. Forums that resolved
/// without a chat id contribute nothing. A plain chat is kept unless the
/// topic list already contains the key `Topic { chat.id, chat.title }`.
#[must_use]
pub fn build_catalog(chats: &[ChatInfo], forums: &[ResolvedForum]) -> ChatCatalog {
    let mut topics = Vec::new();
    for forum in forums {
        let Some(chat_id) = forum.chat_id else {
            continue;
        };
        for title in &forum.topics {
            topics.push(CatalogEntry {
                key: RouteKey::topic(chat_id, title.clone()),
                label: title.clone(),
            });
        }
    }

    let topic_keys: HashSet<&RouteKey> = topics.iter().map(|entry| &entry.key).collect();
    let plain = chats
        .iter()
        .filter(|chat| !topic_keys.contains(&RouteKey::topic(chat.id, chat.title.clone())))
        .map(|chat| CatalogEntry {
            key: RouteKey::Plain(chat.id),
            label: chat.title.clone(),
        })
        .collect();

    ChatCatalog { plain, topics }
}
