use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{Store, StoreError};

/// Flat-file JSON store: one file per record at
/// `{base}/{collection}/{id}.json`. Each write replaces the whole record in
/// a single filesystem call, so per-key operations don't interleave.
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base.join(collection).join(format!("{id}.json"))
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::NotFound { collection: collection.to_string(), id: id.to_string() }
    }

    fn serialize(collection: &str, id: &str, record: &Value) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(record).map_err(|source| StoreError::Malformed {
            collection: collection.to_string(),
            id: id.to_string(),
            source,
        })
    }

    async fn exists(path: &Path) -> Result<bool, StoreError> {
        Ok(fs::try_exists(path).await?)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if Self::exists(&path).await? {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        fs::write(&path, Self::serialize(collection, id, record)?).await?;
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(collection, id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Self::not_found(collection, id));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            collection: collection.to_string(),
            id: id.to_string(),
            source,
        })
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        if !Self::exists(&path).await? {
            return Err(Self::not_found(collection, id));
        }
        fs::write(&path, Self::serialize(collection, id, record)?).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Self::not_found(collection, id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.base.join(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
