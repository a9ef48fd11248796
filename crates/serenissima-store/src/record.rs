//! Record envelope types shared by both backends.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// The store-assigned identifier of one record in one table.
///
/// Opaque to this tooling; business lookups go through business-id fields,
/// record ids address a row for update.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Mint a fresh record id (memory backend only; the hosted store
    /// assigns its own).
    pub(crate) fn mint() -> Self {
        Self(format!("rec{}", Uuid::now_v7().simple()))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record as both backends produce it: id, creation time, raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Store-assigned record id.
    pub id: RecordId,
    /// When the store created the record.
    #[serde(rename = "createdTime")]
    pub created_at: DateTime<Utc>,
    /// The record's fields as a JSON object.
    pub fields: serde_json::Value,
}

impl RawRecord {
    /// Deserialize the fields into a typed entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the fields do not match
    /// the entity's schema.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Record<T>, StoreError> {
        let fields = serde_json::from_value(self.fields)?;
        Ok(Record {
            id: self.id,
            created_at: self.created_at,
            fields,
        })
    }
}

/// A record with its fields deserialized into an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    /// Store-assigned record id.
    pub id: RecordId,
    /// When the store created the record.
    pub created_at: DateTime<Utc>,
    /// The typed entity carried by the record.
    pub fields: T,
}
