use crate::store::KeyValueStore;
use inkhaven_core::{CoreError, TagRecord, TaggedPost};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Post id -> classification. Presence of an id means the post is never
/// classified again.
pub struct TagCache {
    store: Arc<dyn KeyValueStore<TagRecord>>,
    entries: BTreeMap<String, TagRecord>,
}

impl TagCache {
    pub async fn open(store: Arc<dyn KeyValueStore<TagRecord>>) -> Result<Self, CoreError> {
        let entries = store.load().await?;
        debug!("Loaded {} tagged posts from {}", entries.len(), store.describe());
        Ok(Self { store, entries })
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.entries.contains_key(post_id)
    }

    pub fn get(&self, post_id: &str) -> Option<&TagRecord> {
        self.entries.get(post_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, TagRecord> {
        &self.entries
    }

    /// Add a record and rewrite the store immediately.
    ///
    /// Returns `Ok(false)` without writing if the id is already cached. If the
    /// write fails the in-memory entry is dropped again.
    pub async fn insert(&mut self, post_id: String, record: TagRecord) -> Result<bool, CoreError> {
        if self.entries.contains_key(&post_id) {
            return Ok(false);
        }

        self.entries.insert(post_id.clone(), record);
        if let Err(e) = self.store.save(&self.entries).await {
            self.entries.remove(&post_id);
            return Err(e.into());
        }

        debug!("Cached tags for {}", post_id);
        Ok(true)
    }

    pub fn posts(&self) -> Vec<TaggedPost> {
        self.entries
            .iter()
            .map(|(id, record)| TaggedPost {
                id: id.clone(),
                record: record.clone(),
            })
            .collect()
    }

    /// Sorted union of machine tags.
    pub fn all_tags(&self) -> Vec<String> {
        self.entries
            .values()
            .flat_map(|record| record.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct non-empty author names.
    pub fn all_authors(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|record| !record.author.is_empty())
            .map(|record| record.author.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
