//! Keyed record storage.
//!
//! Records travel as raw JSON values; callers deserialize into their own
//! types. Per-key operations are atomic at single-key granularity, which is
//! all the engine relies on.

pub mod file;
#[cfg(test)]
pub mod memory;

pub use file::FileStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const USERS: &str = "users";
pub const TOKENS: &str = "tokens";
pub const CHECKS: &str = "checks";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    #[error("malformed record {collection}/{id}: {source}")]
    Malformed {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable keyed storage for check, user and token records
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a new record; fails with `AlreadyExists` if the key is taken
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Overwrite an existing record; fails with `NotFound` if absent
    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// All record ids in a collection; empty for a collection never written
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError>;
}
