//! Error types for the Simulation API client.

/// Maximum length of a remote error body carried inside an error value.
const MAX_ERROR_BODY: usize = 500;

/// Errors that can occur in the Simulation API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP transport failed before a response arrived. Retryable.
    #[error("simulation API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("simulation API returned {status} for {path}: {body}")]
    RemoteStatus {
        /// The request path.
        path: String,
        /// The HTTP status code.
        status: u16,
        /// The response body, truncated.
        body: String,
    },

    /// The response was well-formed JSON but matched neither accepted
    /// envelope shape (bare list or single keyed list).
    #[error("simulation API response for {path} has no recognizable list: {detail}")]
    MalformedEnvelope {
        /// The request path.
        path: String,
        /// What was found instead.
        detail: String,
    },

    /// A serialization or deserialization error.
    #[error("simulation API (de)serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::RemoteStatus { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedEnvelope { .. } | Self::Serialization(_) => false,
        }
    }

    /// Build a [`ApiError::RemoteStatus`], truncating the body.
    pub(crate) fn remote(path: &str, status: u16, body: &str) -> Self {
        let truncated = if body.len() <= MAX_ERROR_BODY {
            body.to_owned()
        } else {
            let mut t: String = body.chars().take(MAX_ERROR_BODY).collect();
            t.push_str("...");
            t
        };
        Self::RemoteStatus {
            path: path.to_owned(),
            status,
            body: truncated,
        }
    }
}
