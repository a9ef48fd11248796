//! In-memory backend: the same table semantics without a network.
//!
//! Used by the test suites and by `--dry-run` invocations, where lifecycle
//! code must run end to end against a store that nobody else can see.
//! Filters are evaluated with [`Filter::matches`], so the queries exercised
//! here are the queries sent over the wire in production.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde_json::Value;

use serenissima_types::Table;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::record::{RawRecord, RecordId};

/// One stored row: creation time plus the fields object.
#[derive(Debug, Clone)]
struct StoredRow {
    created_at: chrono::DateTime<Utc>,
    fields: Value,
}

/// In-memory table set behind a mutex.
///
/// Insertion order is preserved per table via the record ids, which are
/// UUID v7 and therefore time-ordered under the `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<BTreeMap<&'static str, BTreeMap<String, StoredRow>>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one record, minting a record id.
    pub(crate) fn create(&self, table: Table, fields: Value) -> Result<RawRecord, StoreError> {
        let id = RecordId::mint();
        let row = StoredRow {
            created_at: Utc::now(),
            fields,
        };
        let mut tables = self.lock();
        tables
            .entry(table.name())
            .or_default()
            .insert(id.0.clone(), row.clone());
        Ok(RawRecord {
            id,
            created_at: row.created_at,
            fields: row.fields,
        })
    }

    /// Fetch one record by id.
    pub(crate) fn get(&self, table: Table, id: &RecordId) -> Result<RawRecord, StoreError> {
        let tables = self.lock();
        tables
            .get(table.name())
            .and_then(|rows| rows.get(id.as_str()))
            .map(|row| RawRecord {
                id: id.clone(),
                created_at: row.created_at,
                fields: row.fields.clone(),
            })
            .ok_or_else(|| StoreError::not_found(table, id.as_str().to_owned()))
    }

    /// Merge the supplied fields into an existing record.
    pub(crate) fn update(
        &self,
        table: Table,
        id: &RecordId,
        fields: Value,
    ) -> Result<RawRecord, StoreError> {
        let mut tables = self.lock();
        let row = tables
            .get_mut(table.name())
            .and_then(|rows| rows.get_mut(id.as_str()))
            .ok_or_else(|| StoreError::not_found(table, id.as_str().to_owned()))?;

        if let (Value::Object(existing), Value::Object(patch)) = (&mut row.fields, fields) {
            for (key, value) in patch {
                existing.insert(key, value);
            }
        }
        Ok(RawRecord {
            id: id.clone(),
            created_at: row.created_at,
            fields: row.fields.clone(),
        })
    }

    /// List records matching a filter, in creation order.
    pub(crate) fn list(&self, table: Table, filter: &Filter) -> Vec<RawRecord> {
        let tables = self.lock();
        tables
            .get(table.name())
            .map(|rows| {
                rows.iter()
                    .filter(|(_, row)| filter.matches(&row.fields))
                    .map(|(id, row)| RawRecord {
                        id: RecordId(id.clone()),
                        created_at: row.created_at,
                        fields: row.fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Acquire the table lock, recovering from poisoning.
    ///
    /// A panic in another thread holding the lock leaves the data as it
    /// was mid-operation; for a test/dry-run store that is acceptable and
    /// better than propagating the poison.
    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<&'static str, BTreeMap<String, StoredRow>>> {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
