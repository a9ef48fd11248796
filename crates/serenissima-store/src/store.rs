//! The [`RecordStore`] facade and backend dispatch.
//!
//! Backend selection uses enum dispatch rather than a trait object: async
//! methods are not dyn-compatible, and two backends do not justify the
//! indirection. Creators, processors, and reports all depend only on
//! [`RecordStore`], so a test can hand them a memory-backed store and a
//! production caller an HTTPS one without either noticing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use serenissima_types::Table;

use crate::error::StoreError;
use crate::filter::Filter;
use crate::http::{HttpBackend, StoreHttpConfig};
use crate::memory::MemoryBackend;
use crate::record::{RawRecord, Record, RecordId};

/// A storage backend the [`RecordStore`] can dispatch to.
#[derive(Debug, Clone)]
pub enum Backend {
    /// The hosted store, over HTTPS.
    Http(HttpBackend),
    /// In-process tables for tests and dry runs.
    Memory(MemoryBackend),
}

/// Typed client for the Record Store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    backend: Backend,
}

impl RecordStore {
    /// Open a store against the hosted backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] on blank credentials or client
    /// construction failure.
    pub fn http(config: &StoreHttpConfig) -> Result<Self, StoreError> {
        Ok(Self {
            backend: Backend::Http(HttpBackend::new(config)?),
        })
    }

    /// Open an empty in-memory store.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryBackend::new()),
        }
    }

    /// Human-readable backend name for logging.
    pub const fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Http(_) => "http",
            Backend::Memory(_) => "memory",
        }
    }

    /// Insert one typed record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn create<T>(&self, table: Table, entity: &T) -> Result<Record<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let fields = serde_json::to_value(entity)?;
        let raw = match &self.backend {
            Backend::Http(http) => http.create(table, fields).await?,
            Backend::Memory(memory) => memory.create(table, fields)?,
        };
        raw.into_typed()
    }

    /// Fetch one typed record by store-assigned id.
    pub async fn get<T>(&self, table: Table, id: &RecordId) -> Result<Record<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let raw = match &self.backend {
            Backend::Http(http) => http.get(table, id).await?,
            Backend::Memory(memory) => memory.get(table, id)?,
        };
        raw.into_typed()
    }

    /// Partially update one record: only the supplied fields change.
    ///
    /// The patch is a JSON object; use [`Self::replace`] to write a whole
    /// entity back.
    pub async fn update_fields(
        &self,
        table: Table,
        id: &RecordId,
        patch: Value,
    ) -> Result<RawRecord, StoreError> {
        match &self.backend {
            Backend::Http(http) => http.update(table, id, patch).await,
            Backend::Memory(memory) => memory.update(table, id, patch),
        }
    }

    /// Write a whole entity over an existing record.
    pub async fn replace<T>(
        &self,
        table: Table,
        id: &RecordId,
        entity: &T,
    ) -> Result<Record<T>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let fields = serde_json::to_value(entity)?;
        let raw = self.update_fields(table, id, fields).await?;
        raw.into_typed()
    }

    /// List all typed records matching a filter.
    pub async fn list<T>(&self, table: Table, filter: &Filter) -> Result<Vec<Record<T>>, StoreError>
    where
        T: DeserializeOwned,
    {
        let raws = match &self.backend {
            Backend::Http(http) => http.list(table, filter).await?,
            Backend::Memory(memory) => memory.list(table, filter),
        };
        raws.into_iter().map(RawRecord::into_typed).collect()
    }

    /// Return the first record matching a filter, if any.
    pub async fn find_first<T>(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<Record<T>>, StoreError>
    where
        T: DeserializeOwned,
    {
        let mut records = self.list(table, filter).await?;
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records.swap_remove(0)))
        }
    }

    /// Return the record matching a filter, or a typed not-found error.
    ///
    /// `key` describes the lookup for the error message.
    pub async fn require<T>(
        &self,
        table: Table,
        filter: &Filter,
        key: &str,
    ) -> Result<Record<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.find_first(table, filter)
            .await?
            .ok_or_else(|| StoreError::not_found(table, key.to_owned()))
    }
}
