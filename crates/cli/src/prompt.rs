use {anyhow::Context, dialoguer::MultiSelect};

use {
    copycat_catalog::{CatalogEntry, ChatCatalog},
    copycat_common::RouteKey,
};

/// Block on a multi-select over the catalog and return the chosen keys.
///
/// Entries appear in prompt order: plain chats first, then forum topics
/// labeled with their full `chat/title` form so same-named topics from
/// different forums stay distinguishable.
pub fn select_tracked(catalog: &ChatCatalog) -> anyhow::Result<Vec<RouteKey>> {
    let entries: Vec<&CatalogEntry> = catalog.entries().collect();
    let labels: Vec<String> = entries.iter().map(|entry| label_of(entry)).collect();

    let picked = MultiSelect::new()
        .with_prompt("Select chats and topics to track (space to toggle, enter to confirm)")
        .items(&labels)
        .interact()
        .context("chat selection prompt failed")?;

    Ok(picked
        .into_iter()
        .filter_map(|index| entries.get(index))
        .map(|entry| entry.key.clone())
        .collect())
}

fn label_of(entry: &CatalogEntry) -> String {
    match &entry.key {
        RouteKey::Plain(_) => entry.label.clone(),
        RouteKey::Topic { .. } => entry.key.to_string(),
    }
}
