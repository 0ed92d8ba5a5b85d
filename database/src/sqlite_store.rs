use crate::store::KeyValueStore;
use async_trait::async_trait;
use inkhaven_core::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use tracing::{debug, info};

const CREATE_ENTRIES_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
)";

/// Open a SQLite pool and make sure the entries table exists.
///
/// A single connection keeps `sqlite::memory:` databases shared across calls.
pub async fn connect_sqlite(url: &str) -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await?;
    sqlx::query(CREATE_ENTRIES_TABLE).execute(&pool).await?;
    info!("Connected to SQLite store at {}", url);
    Ok(pool)
}

/// One namespace of the shared `kv_entries` table; values are JSON text.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for SqliteStore
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn describe(&self) -> String {
        format!("sqlite:{}", self.namespace)
    }

    async fn load(&self) -> Result<BTreeMap<String, V>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM kv_entries WHERE namespace = ?")
                .bind(&self.namespace)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(key, value)| {
                let parsed = serde_json::from_str(&value).map_err(|e| StoreError::Corrupt {
                    path: format!("sqlite:{}/{}", self.namespace, key),
                    details: e.to_string(),
                })?;
                Ok::<_, StoreError>((key, parsed))
            })
            .collect()
    }

    async fn save(&self, entries: &BTreeMap<String, V>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM kv_entries WHERE namespace = ?")
            .bind(&self.namespace)
            .execute(&mut *tx)
            .await?;

        for (key, value) in entries {
            let json = serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
                path: format!("sqlite:{}/{}", self.namespace, key),
                details: e.to_string(),
            })?;
            sqlx::query("INSERT INTO kv_entries (namespace, key, value) VALUES (?, ?, ?)")
                .bind(&self.namespace)
                .bind(key)
                .bind(json)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Wrote {} entries to sqlite:{}", entries.len(), self.namespace);
        Ok(())
    }
}
