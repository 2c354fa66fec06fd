//! Image record lookup.
//!
//! The transformation flow only needs to resolve an identifier to a record's
//! `location`; [`ImageStore`] is that seam. Records are never updated, so the
//! in-memory store offers insert, get and remove only.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::error::{Result, TransformError};
use crate::types::{CallerId, ImageId, ImageRecord};

/// Persistence collaborator that owns image records.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Look up a record. `Ok(None)` means no such image.
    async fn get(&self, id: &ImageId) -> std::result::Result<Option<ImageRecord>, TransformError>;
}

/// Image records held in memory.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    records: RwLock<HashMap<ImageId, ImageRecord>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of records. Later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = ImageRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Add a record, returning the one it replaced, if any.
    pub fn insert(&self, record: ImageRecord) -> Option<ImageRecord> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id.clone(), record)
    }

    /// Delete a record.
    pub fn remove(&self, id: &ImageId) -> Option<ImageRecord> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.remove(id)
    }

    /// All records owned by `owner`, sorted by id.
    pub fn list_for_owner(&self, owner: &CallerId) -> Vec<ImageRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<ImageRecord> = records
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        owned
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn get(&self, id: &ImageId) -> std::result::Result<Option<ImageRecord>, TransformError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(id).cloned())
    }
}

/// A JSON file holding an array of image records.
pub struct JsonCatalog;

impl JsonCatalog {
    /// Read the catalog into a memory store.
    pub fn load(path: &Path) -> Result<MemoryImageStore> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<ImageRecord> = serde_json::from_str(&content)?;
        tracing::debug!("Loaded {} image records from {:?}", records.len(), path);
        Ok(MemoryImageStore::from_records(records))
    }
}
