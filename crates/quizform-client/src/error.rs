//! Google API client error types.

/// Errors from Forms and Drive API calls.
#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl GoogleApiError {
    /// HTTP status carried by an [`GoogleApiError::ApiError`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Turn a response into `T`, mapping non-2xx statuses and decode failures.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, GoogleApiError> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError {
            endpoint: endpoint.into(),
            status,
            body,
        });
    }

    resp.json().await.map_err(|e| GoogleApiError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })
}
