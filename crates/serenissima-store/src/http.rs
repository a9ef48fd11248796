//! HTTPS backend for the hosted Record Store.
//!
//! The store exposes one REST surface per base: records live at
//! `{base_url}/{base_id}/{TABLE}`, list queries take the rendered formula
//! in a `filterByFormula` query parameter and paginate via an opaque
//! `offset` token. Authentication is a bearer API key.
//!
//! All calls share one fixed request timeout from the configuration; there
//! is no retry or backoff here -- errors carry a retryable flag and the
//! caller owns the policy.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use serenissima_types::Table;

use crate::error::{truncate_body, StoreError};
use crate::filter::Filter;
use crate::record::{RawRecord, RecordId};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size requested from the store's list endpoint.
const PAGE_SIZE: usize = 100;

/// Configuration for the HTTPS backend.
#[derive(Debug, Clone)]
pub struct StoreHttpConfig {
    /// Root of the hosted store's REST surface,
    /// e.g. `https://api.recordhost.example/v0`.
    pub base_url: String,
    /// The base (database) identifier within the host.
    pub base_id: String,
    /// Bearer API key.
    pub api_key: String,
    /// Fixed timeout applied to every request.
    pub timeout: Duration,
}

impl StoreHttpConfig {
    /// Create a configuration with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        base_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            base_id: base_id.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One page of a list response.
#[derive(Debug, Deserialize)]
struct ListPage {
    records: Vec<RawRecord>,
    offset: Option<String>,
}

/// Connection handle to the hosted Record Store.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    base_id: String,
    api_key: String,
}

impl HttpBackend {
    /// Build a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if credentials are blank or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &StoreHttpConfig) -> Result<Self, StoreError> {
        if config.api_key.trim().is_empty() {
            return Err(StoreError::Config("record store API key is empty".to_owned()));
        }
        if config.base_id.trim().is_empty() {
            return Err(StoreError::Config("record store base id is empty".to_owned()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(
            base_url = %config.base_url,
            base_id = %config.base_id,
            timeout_secs = config.timeout.as_secs(),
            "Record store HTTP backend ready"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            base_id: config.base_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Insert one record; the store assigns the record id.
    pub(crate) async fn create(
        &self,
        table: Table,
        fields: Value,
    ) -> Result<RawRecord, StoreError> {
        let url = self.table_url(table);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        Self::decode_record(table, response).await
    }

    /// Fetch one record by store-assigned id.
    pub(crate) async fn get(
        &self,
        table: Table,
        id: &RecordId,
    ) -> Result<RawRecord, StoreError> {
        let url = format!("{}/{}", self.table_url(table), id.as_str());
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(StoreError::not_found(table, id.as_str().to_owned()));
        }
        Self::decode_record(table, response).await
    }

    /// Partially update one record: only the supplied fields change.
    pub(crate) async fn update(
        &self,
        table: Table,
        id: &RecordId,
        fields: Value,
    ) -> Result<RawRecord, StoreError> {
        let url = format!("{}/{}", self.table_url(table), id.as_str());
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(StoreError::not_found(table, id.as_str().to_owned()));
        }
        Self::decode_record(table, response).await
    }

    /// List records matching a filter, following pagination to the end.
    pub(crate) async fn list(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Vec<RawRecord>, StoreError> {
        let url = self.table_url(table);
        let formula = filter.render();
        let page_size = PAGE_SIZE.to_string();
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .query(&[
                    ("filterByFormula", formula.as_str()),
                    ("pageSize", page_size.as_str()),
                ]);
            if let Some(token) = &offset {
                request = request.query(&[("offset", token.as_str())]);
            }
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(StoreError::RemoteStatus {
                    table: table.name(),
                    status: status.as_u16(),
                    body: truncate_body(&body),
                });
            }
            let page: ListPage = response.json().await?;
            records.extend(page.records);
            match page.offset {
                Some(token) => offset = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            table = table.name(),
            formula = %formula,
            count = records.len(),
            "Listed records"
        );
        Ok(records)
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, table.name())
    }

    /// Check the status and decode a single-record response body.
    async fn decode_record(
        table: Table,
        response: reqwest::Response,
    ) -> Result<RawRecord, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RemoteStatus {
                table: table.name(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn blank_credentials_are_rejected_before_any_request() {
        let config = StoreHttpConfig::new("https://store.example/v0", "base123", "  ");
        assert!(matches!(HttpBackend::new(&config), Err(StoreError::Config(_))));

        let config = StoreHttpConfig::new("https://store.example/v0", "", "key");
        assert!(matches!(HttpBackend::new(&config), Err(StoreError::Config(_))));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let config = StoreHttpConfig::new("https://store.example/v0/", "base123", "key");
        let backend = HttpBackend::new(&config).expect("client build failed");
        assert_eq!(
            backend.table_url(Table::Citizens),
            "https://store.example/v0/base123/CITIZENS"
        );
    }
}
