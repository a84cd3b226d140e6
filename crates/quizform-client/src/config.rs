//! Google API client configuration.
//!
//! Configures base URLs for the Forms and Drive REST APIs and the bearer
//! token used to call them. Defaults point to production endpoints.
//! Override via environment variables or explicit construction for tests.

use url::Url;
use zeroize::Zeroizing;

/// Default Forms API base URL.
pub const DEFAULT_FORMS_URL: &str = "https://forms.googleapis.com";

/// Default Drive API base URL.
pub const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com";

/// Configuration for connecting to the Forms and Drive APIs.
///
/// Custom `Debug` implementation redacts the `access_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct GoogleApiConfig {
    /// Base URL for the Forms API.
    pub forms_url: Url,
    /// Base URL for the Drive API.
    pub drive_url: Url,
    /// OAuth bearer token with the `forms.body` and `drive.file` scopes.
    /// Obtaining it is outside this crate.
    pub access_token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GoogleApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleApiConfig")
            .field("forms_url", &self.forms_url)
            .field("drive_url", &self.drive_url)
            .field("access_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GoogleApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `QUIZFORM_ACCESS_TOKEN` (required)
    /// - `QUIZFORM_FORMS_URL` (default: `https://forms.googleapis.com`)
    /// - `QUIZFORM_DRIVE_URL` (default: `https://www.googleapis.com`)
    /// - `QUIZFORM_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = std::env::var("QUIZFORM_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            forms_url: env_url("QUIZFORM_FORMS_URL", DEFAULT_FORMS_URL)?,
            drive_url: env_url("QUIZFORM_DRIVE_URL", DEFAULT_DRIVE_URL)?,
            access_token: Zeroizing::new(access_token),
            timeout_secs: std::env::var("QUIZFORM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("QUIZFORM_ACCESS_TOKEN environment variable is required")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
