//! In-memory record store for testing and development

use crate::core::error::{QueryResult, StorageError};
use crate::core::filter::WhereClause;
use crate::core::record::Record;
use crate::core::sort::OrderBy;
use crate::core::store::RecordStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory record store
///
/// Filters, sorts and slices on every call. Uses RwLock for thread-safe
/// access; clones share the same records.
#[derive(Clone)]
pub struct InMemoryRecordStore<R: Record> {
    records: Arc<RwLock<HashMap<Uuid, R>>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a record
    pub fn insert(&self, record: R) -> QueryResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(record.id(), record);
        Ok(())
    }

    /// Insert or replace several records
    pub fn insert_many(&self, items: impl IntoIterator<Item = R>) -> QueryResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        for record in items {
            records.insert(record.id(), record);
        }
        Ok(())
    }

    /// Remove a record, returning it if it existed
    pub fn remove(&self, id: &Uuid) -> QueryResult<Option<R>> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records.remove(id))
    }

    pub fn len(&self) -> QueryResult<usize> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> QueryResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> FromIterator<R> for InMemoryRecordStore<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let records = iter.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn find_many(
        &self,
        filter: &WhereClause,
        order: &OrderBy,
        skip: usize,
        take: usize,
    ) -> QueryResult<Vec<R>> {
        let records = self.records.read().map_err(poisoned)?;

        let mut matching: Vec<&R> = records.values().filter(|r| filter.matches(*r)).collect();
        matching.sort_by(|a, b| order.compare(*a, *b));

        Ok(matching.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count(&self, filter: &WhereClause) -> QueryResult<usize> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().filter(|r| filter.matches(*r)).count())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::LockPoisoned {
        message: e.to_string(),
    }
}
