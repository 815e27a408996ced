use std::{collections::HashSet, sync::Mutex};

use copycat_common::ChatId;

/// Which way a toggle went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Destination chats for matched messages.
///
/// Starts empty on every run and is only mutated by the owner's toggle
/// command. std::sync::Mutex because all operations are plain set lookups,
/// never held across `.await` points; the fan-out reads a snapshot.
#[derive(Debug, Default)]
pub struct OutputSet {
    chats: Mutex<HashSet<ChatId>>,
}

impl OutputSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `chat`'s membership, reporting which way it went.
    pub fn toggle(&self, chat: ChatId) -> Toggle {
        let mut chats = self.chats.lock().unwrap_or_else(|e| e.into_inner());
        if chats.remove(&chat) {
            Toggle::Removed
        } else {
            chats.insert(chat);
            Toggle::Added
        }
    }

    /// Point-in-time copy of the destinations.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatId> {
        let chats = self.chats.lock().unwrap_or_else(|e| e.into_inner());
        chats.iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, chat: ChatId) -> bool {
        self.chats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&chat)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}
