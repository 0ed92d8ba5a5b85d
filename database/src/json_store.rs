use crate::store::KeyValueStore;
use async_trait::async_trait;
use inkhaven_core::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Store backed by a single pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Sibling temp file, unique per write so concurrent writers never share one.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for JsonFileStore
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn describe(&self) -> String {
        self.display_path()
    }

    async fn load(&self) -> Result<BTreeMap<String, V>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.display_path());
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.display_path(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            path: self.display_path(),
            details: e.to_string(),
        })
    }

    async fn save(&self, entries: &BTreeMap<String, V>) -> Result<(), StoreError> {
        let write_failed = |source: io::Error| StoreError::WriteFailed {
            path: self.display_path(),
            source,
        };

        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| write_failed(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        // Readers see either the old or the new document, never a partial one.
        let temp_path = self.temp_path();
        if let Err(e) = tokio::fs::write(&temp_path, &json).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_failed(e));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(write_failed(e));
        }

        debug!("Wrote {} entries to {}", entries.len(), self.display_path());
        Ok(())
    }
}
