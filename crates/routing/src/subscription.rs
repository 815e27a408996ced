use std::collections::HashSet;

use copycat_common::RouteKey;

/// The tracked chats and topics, frozen at startup.
///
/// Built once from the selection prompt; there is no re-subscription while
/// the process runs. Lookup is exact structural equality, no normalization.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    keys: HashSet<RouteKey>,
}

impl SubscriptionSet {
    #[must_use]
    pub fn from_selection(keys: impl IntoIterator<Item = RouteKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &RouteKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
