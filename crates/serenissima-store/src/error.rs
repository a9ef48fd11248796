//! Error types for the Record Store client.
//!
//! Every error answers [`StoreError::is_retryable`], so callers can decide
//! programmatically whether a failed operation is worth another attempt.
//! Earlier tooling collapsed everything to a logged boolean; the retry
//! policy then had to be guessed from log text.

use serenissima_types::Table;

/// Maximum length of a remote error body carried inside an error value.
pub(crate) const MAX_ERROR_BODY: usize = 500;

/// Errors that can occur in the Record Store client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP transport failed before a response arrived (DNS, connect,
    /// timeout). Retryable.
    #[error("record store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status. The body is truncated
    /// to keep log lines bounded.
    #[error("record store returned {status} for {table}: {body}")]
    RemoteStatus {
        /// The table the request addressed.
        table: &'static str,
        /// The HTTP status code.
        status: u16,
        /// The response body, truncated to 500 characters.
        body: String,
    },

    /// A record expected to exist was not found.
    #[error("record not found in {table}: {key}")]
    NotFound {
        /// The table searched.
        table: &'static str,
        /// Human-readable description of the lookup key.
        key: String,
    },

    /// A serialization or deserialization error.
    #[error("record (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client was misconfigured (bad base URL, missing credentials).
    #[error("record store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`] with a formatted key.
    pub fn not_found(table: Table, key: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.name(),
            key: key.into(),
        }
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Transport failures and server-side statuses (429, 5xx) are
    /// retryable; everything else indicates a caller or data problem that
    /// a retry will reproduce.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::RemoteStatus { status, .. } => *status == 429 || *status >= 500,
            Self::NotFound { .. } | Self::Serialization(_) | Self::Config(_) => false,
        }
    }
}

/// Truncate a remote error body for inclusion in an error value.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        body.to_owned()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_BODY)
            .last()
            .map_or(0, |(i, c)| i.saturating_add(c.len_utf8()));
        let mut truncated = body.get(..cut).unwrap_or_default().to_owned();
        truncated.push_str("...");
        truncated
    }
}
