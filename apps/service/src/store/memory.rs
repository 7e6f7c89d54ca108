//! In-memory store used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Store, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn insert(&self, collection: &str, id: &str, record: Value) {
        self.records
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), record);
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = (collection.to_string(), id.to_string());
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        self.get(collection, id).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = (collection.to_string(), id.to_string());
        if !records.contains_key(&key) {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
