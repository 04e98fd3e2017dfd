use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::Record;

/// Repository
///
/// Storage contract for records. Iteration order is insertion order and ids
/// are assigned sequentially from 1.
pub trait Repository: Send + Sync {
    fn all(&self) -> Vec<Record>;
    fn find(&self, id: u64) -> Option<Record>;
    fn create(&self, attributes: Vec<(String, String)>) -> Record;
    // Merges the given attributes into an existing record.
    fn update(&self, id: u64, attributes: Vec<(String, String)>) -> Option<Record>;
    // Drops every record and restarts ids at 1.
    fn reset(&self);
}

/// RepositoryState
///
/// The shared handle actions capture.
pub type RepositoryState = Arc<dyn Repository>;

/// InMemoryRepository
///
/// Process-local store backing the records controller and its tests.
#[derive(Default)]
pub struct InMemoryRepository {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Repository for InMemoryRepository {
    fn all(&self) -> Vec<Record> {
        self.read().clone()
    }

    fn find(&self, id: u64) -> Option<Record> {
        self.read().iter().find(|record| record.id == id).cloned()
    }

    fn create(&self, attributes: Vec<(String, String)>) -> Record {
        let mut records = self.write();
        let id = records.last().map_or(1, |record| record.id + 1);
        let mut record = Record { id, attributes: Vec::new() };
        for (key, value) in attributes {
            record.set(key, value);
        }
        records.push(record.clone());
        tracing::debug!(id, "record created");
        record
    }

    fn update(&self, id: u64, attributes: Vec<(String, String)>) -> Option<Record> {
        let mut records = self.write();
        let record = records.iter_mut().find(|record| record.id == id)?;
        for (key, value) in attributes {
            record.set(key, value);
        }
        Some(record.clone())
    }

    fn reset(&self) {
        self.write().clear();
    }
}
