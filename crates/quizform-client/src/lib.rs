//! # quizform-client -- Typed Rust clients for Google Forms and Drive
//!
//! Provides typed access to the two remote services a quiz publish needs:
//! - **Forms** via `forms.googleapis.com` (create, fetch, `batchUpdate`)
//! - **Drive** via `www.googleapis.com/drive/v3` (search, folders, rename,
//!   trash/restore, move)
//!
//! ## Architecture
//!
//! [`GoogleClient`] owns one `reqwest::Client` carrying the bearer token and
//! hands out [`forms::FormsClient`] and [`drive::DriveClient`]. Callers that
//! want to stay testable program against [`FormService`] and
//! [`DriveService`]; [`memory::InMemoryGoogle`] implements both without a
//! network.
//!
//! Requests are sent once. A failed call surfaces as [`GoogleApiError`] and
//! the caller decides whether it is fatal.

pub mod config;
pub mod drive;
pub mod error;
pub mod forms;
pub mod memory;
pub mod service;

pub use config::GoogleApiConfig;
pub use error::GoogleApiError;
pub use service::{DriveService, FormService};

use std::time::Duration;

/// Top-level client. Holds the Forms and Drive sub-clients.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    forms: forms::FormsClient,
    drive: drive::DriveClient,
}

impl GoogleClient {
    /// Create a client from configuration.
    pub fn new(config: GoogleApiConfig) -> Result<Self, GoogleApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut bearer = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.access_token.as_str()
                ))
                .map_err(|_| GoogleApiError::Config(config::ConfigError::MissingToken))?;
                bearer.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, bearer);
                headers
            })
            .build()
            .map_err(|e| GoogleApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        tracing::debug!(
            forms_url = %config.forms_url,
            drive_url = %config.drive_url,
            timeout_secs = config.timeout_secs,
            "google api client ready"
        );

        Ok(Self {
            forms: forms::FormsClient::new(http.clone(), config.forms_url),
            drive: drive::DriveClient::new(http, config.drive_url),
        })
    }

    /// Access the Forms client.
    pub fn forms(&self) -> &forms::FormsClient {
        &self.forms
    }

    /// Access the Drive client.
    pub fn drive(&self) -> &drive::DriveClient {
        &self.drive
    }
}
