use async_trait::async_trait;
use inkhaven_core::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// A whole-document key-value store.
///
/// `load` on a store that was never written returns an empty map. `save`
/// replaces every entry.
#[async_trait]
pub trait KeyValueStore<V>: Send + Sync
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<BTreeMap<String, V>, StoreError>;

    async fn save(&self, entries: &BTreeMap<String, V>) -> Result<(), StoreError>;
}
