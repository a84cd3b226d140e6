//! Publish settings: Drive folder, forms directory and receipt location.
//!
//! Defaults cover the usual layout. A YAML file passed with `--config` can
//! override any of them:
//!
//! ```yaml
//! folder_name: Personal study assistant
//! folder_id: 1GTXIcWBu-cQwot0arZe6qW921R4I-Hk7
//! forms_dir: forms
//! receipt_path: last_published_form.txt
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default Drive folder forms are filed into.
pub const DEFAULT_FOLDER_NAME: &str = "Personal study assistant";

/// Default directory holding quiz sources.
pub const DEFAULT_FORMS_DIR: &str = "forms";

/// Default receipt file written after a publish.
pub const DEFAULT_RECEIPT_PATH: &str = "last_published_form.txt";

/// Settings loaded once per run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSettings {
    /// Name of the Drive folder forms live in; created when missing.
    pub folder_name: String,
    /// Known id of that folder. Checked before searching by name.
    pub folder_id: Option<String>,
    /// Directory of quiz sources.
    pub forms_dir: PathBuf,
    /// Where the publish receipt is written.
    pub receipt_path: PathBuf,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            folder_id: None,
            forms_dir: PathBuf::from(DEFAULT_FORMS_DIR),
            receipt_path: PathBuf::from(DEFAULT_RECEIPT_PATH),
        }
    }
}

/// Errors loading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl PublishSettings {
    /// Load settings from `path`, or the defaults when no path is given.
    ///
    /// An empty file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_yaml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            path = %path.display(),
            folder = %settings.folder_name,
            "loaded publish settings"
        );
        Ok(settings)
    }
}
