use crate::store::KeyValueStore;
use inkhaven_core::{CommunityTags, CoreError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTagOutcome {
    Added(String),
    AlreadyPresent(String),
}

/// Trim and lowercase a submitted tag; `None` if nothing is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let normalized = tag.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// User-contributed free-text tags, independent of the machine tag cache.
///
/// Every read goes to the backing store. Writes are serialized within this
/// process; separate processes writing the same store can still lose updates.
pub struct CommunityTagStore {
    store: Arc<dyn KeyValueStore<Vec<String>>>,
    write_lock: Mutex<()>,
}

impl CommunityTagStore {
    pub fn new(store: Arc<dyn KeyValueStore<Vec<String>>>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<CommunityTags, CoreError> {
        Ok(self.store.load().await?)
    }

    pub async fn add_tag(&self, post_id: &str, tag: &str) -> Result<AddTagOutcome, CoreError> {
        let tag = normalize_tag(tag).ok_or_else(|| CoreError::Validation {
            message: "Tag cannot be empty".to_string(),
        })?;
        if post_id.is_empty() {
            return Err(CoreError::Validation {
                message: "Post id cannot be empty".to_string(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut tags = self.store.load().await?;
        let post_tags = tags.entry(post_id.to_string()).or_default();

        if post_tags.contains(&tag) {
            return Ok(AddTagOutcome::AlreadyPresent(tag));
        }

        post_tags.push(tag.clone());
        self.store.save(&tags).await?;
        info!("Added community tag '{}' to {}", tag, post_id);
        Ok(AddTagOutcome::Added(tag))
    }

    /// Sorted union of community tags across all posts.
    pub async fn all_tags(&self) -> Result<Vec<String>, CoreError> {
        let tags = self.load().await?;
        Ok(tags
            .into_values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }
}
