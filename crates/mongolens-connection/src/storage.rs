//! Persistent key/value storage for saved connections and global flags
//!
//! Two implementations are provided: [`JsonFileStorage`] writes every update
//! through to a single JSON file, and [`MemoryStorage`] keeps everything in
//! memory for tests and ephemeral hosts.

use async_trait::async_trait;
use mongolens_core::{ConnectionId, MongolensError, Result, SavedConnection};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Durable storage shared by the connection layer and the first-run gate
#[async_trait]
pub trait StorageController: Send + Sync {
    /// Read a global value
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a global value
    async fn update(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// All saved connections, in insertion order
    async fn saved_connections(&self) -> Result<Vec<SavedConnection>>;

    /// Insert a saved connection, replacing any with the same id
    async fn save_connection(&self, connection: SavedConnection) -> Result<()>;

    /// Remove a saved connection, returning whether it existed
    async fn remove_connection(&self, id: &ConnectionId) -> Result<bool>;

    async fn saved_connection(&self, id: &ConnectionId) -> Result<Option<SavedConnection>> {
        Ok(self
            .saved_connections()
            .await?
            .into_iter()
            .find(|c| &c.id == id))
    }

    async fn has_saved_connections(&self) -> Result<bool> {
        Ok(!self.saved_connections().await?.is_empty())
    }

    /// Read a boolean flag; missing or non-boolean values read as `false`
    async fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

/// On-disk layout of the storage file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct StorageDocument {
    #[serde(default)]
    values: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    connections: Vec<SavedConnection>,
}

impl StorageDocument {
    fn upsert(&mut self, connection: SavedConnection) {
        match self.connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection,
            None => self.connections.push(connection),
        }
    }

    fn remove(&mut self, id: &ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| &c.id != id);
        self.connections.len() != before
    }
}

/// In-memory storage
#[derive(Default)]
pub struct MemoryStorage {
    document: RwLock<StorageDocument>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with saved connections
    pub fn with_connections(connections: impl IntoIterator<Item = SavedConnection>) -> Self {
        let storage = Self::new();
        {
            let mut document = storage.document.write();
            for connection in connections {
                document.upsert(connection);
            }
        }
        storage
    }
}

#[async_trait]
impl StorageController for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.document.read().values.get(key).cloned())
    }

    async fn update(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.document.write().values.insert(key.to_string(), value);
        Ok(())
    }

    async fn saved_connections(&self) -> Result<Vec<SavedConnection>> {
        Ok(self.document.read().connections.clone())
    }

    async fn save_connection(&self, connection: SavedConnection) -> Result<()> {
        self.document.write().upsert(connection);
        Ok(())
    }

    async fn remove_connection(&self, id: &ConnectionId) -> Result<bool> {
        Ok(self.document.write().remove(id))
    }
}

/// Storage backed by a single JSON file
///
/// The whole document is held in memory and rewritten after every update.
/// Writes are serialized so the file always reflects the latest update.
pub struct JsonFileStorage {
    path: PathBuf,
    document: tokio::sync::Mutex<StorageDocument>,
}

impl JsonFileStorage {
    /// Open the storage file, starting empty if it does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let document: StorageDocument = serde_json::from_str(&content).map_err(|e| {
                MongolensError::Storage(format!("failed to parse {}: {e}", path.display()))
            })?;
            tracing::info!(
                path = ?path,
                connections = document.connections.len(),
                values = document.values.len(),
                "storage loaded"
            );
            document
        } else {
            tracing::debug!(path = ?path, "storage file doesn't exist yet, starting empty");
            StorageDocument::default()
        };

        Ok(Self {
            path,
            document: tokio::sync::Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &StorageDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!(path = ?self.path, "storage saved");
        Ok(())
    }

    /// Apply a change and write it through, rolling back the in-memory copy if the write fails
    async fn mutate<T>(&self, change: impl FnOnce(&mut StorageDocument) -> T) -> Result<T> {
        let mut document = self.document.lock().await;
        let previous = document.clone();
        let output = change(&mut document);
        if let Err(e) = self.persist(&document).await {
            tracing::error!(error = %e, path = ?self.path, "failed to write storage");
            *document = previous;
            return Err(e);
        }
        Ok(output)
    }
}

#[async_trait]
impl StorageController for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.document.lock().await.values.get(key).cloned())
    }

    #[tracing::instrument(skip(self, value))]
    async fn update(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.mutate(|document| {
            document.values.insert(key.to_string(), value);
        })
        .await
    }

    async fn saved_connections(&self) -> Result<Vec<SavedConnection>> {
        Ok(self.document.lock().await.connections.clone())
    }

    #[tracing::instrument(skip(self, connection), fields(connection_id = %connection.id))]
    async fn save_connection(&self, connection: SavedConnection) -> Result<()> {
        self.mutate(|document| document.upsert(connection)).await
    }

    #[tracing::instrument(skip(self), fields(connection_id = %id))]
    async fn remove_connection(&self, id: &ConnectionId) -> Result<bool> {
        self.mutate(|document| document.remove(id)).await
    }
}

#[cfg(test)]
mod tests;
