//! The Simulation API client.
//!
//! One reqwest client, one fixed timeout, no local retry -- the caller
//! owns retry policy, informed by [`ApiError::is_retryable`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use serenissima_types::{Activity, ActivityType, Citizen, Contract, Problem, ResourceStack, Username};

use crate::envelope::Envelope;
use crate::error::ApiError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Request body for delegated activity creation.
#[derive(Debug, Clone, Serialize)]
pub struct TryCreateActivity {
    /// The acting citizen.
    pub citizen: Username,
    /// The kind of activity requested.
    pub activity_type: ActivityType,
    /// Type-specific parameters, forwarded opaquely.
    pub parameters: Value,
}

/// Client for the simulation's REST surface.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given API root with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Build a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch all citizens.
    pub async fn citizens(&self) -> Result<Vec<Citizen>, ApiError> {
        self.get_list("/api/citizens").await
    }

    /// Fetch all activities.
    pub async fn activities(&self) -> Result<Vec<Activity>, ApiError> {
        self.get_list("/api/activities").await
    }

    /// Fetch all resource stacks.
    pub async fn resources(&self) -> Result<Vec<ResourceStack>, ApiError> {
        self.get_list("/api/resources").await
    }

    /// Fetch all contracts.
    pub async fn contracts(&self) -> Result<Vec<Contract>, ApiError> {
        self.get_list("/api/contracts").await
    }

    /// Fetch all reported problems.
    pub async fn problems(&self) -> Result<Vec<Problem>, ApiError> {
        self.get_list("/api/problems").await
    }

    /// Ask the simulation to create an activity on a citizen's behalf.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RemoteStatus`] if the simulation refuses, with
    /// the refusal body attached.
    pub async fn try_create_activity(
        &self,
        request: &TryCreateActivity,
    ) -> Result<Activity, ApiError> {
        let path = "/api/activities/try-create";
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::remote(path, status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }

    /// GET a list endpoint and normalize its envelope.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::remote(path, status.as_u16(), &body));
        }
        let value: Value = response.json().await?;
        let envelope = Envelope::from_value(path, value)?;
        tracing::debug!(path, count = envelope.items.len(), "Fetched list");
        Ok(envelope.items)
    }
}
