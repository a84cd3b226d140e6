//! Typed client for the Drive REST API (v3), limited to file metadata.
//!
//! Base URL: `www.googleapis.com`
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/drive/v3/files?q=...` | Search files |
//! | POST   | `/drive/v3/files` | Create metadata-only file (folders) |
//! | GET    | `/drive/v3/files/{fileId}` | Get file metadata |
//! | PATCH  | `/drive/v3/files/{fileId}` | Rename, trash/restore, move |
//!
//! Forms live in Drive as files with [`FORM_MIME`]; folders use
//! [`FOLDER_MIME`].

use serde::{Deserialize, Serialize};

use crate::error::{read_json, GoogleApiError};

const API_PREFIX: &str = "drive/v3/files";

/// Fields requested on every file read.
const FILE_FIELDS: &str = "id,name,mimeType,parents,trashed";

/// MIME type of a Google Form in Drive.
pub const FORM_MIME: &str = "application/vnd.google-apps.form";

/// MIME type of a Drive folder.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// File metadata as returned by Drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub trashed: bool,
}

impl DriveFile {
    pub fn is_in(&self, folder_id: &str) -> bool {
        self.parents.iter().any(|p| p == folder_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Metadata-only file creation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFile<'a> {
    name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<Vec<&'a str>>,
}

// -- Queries --------------------------------------------------------------------

/// Builder for Drive's `q` search expression.
///
/// Only the clauses this crate needs: exact name, MIME type, parent folder
/// and trash state. Values are quoted with `'` and escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub parent: Option<String>,
    pub trashed: Option<bool>,
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.parent = Some(folder_id.into());
        self
    }

    pub fn trashed(mut self, trashed: bool) -> Self {
        self.trashed = Some(trashed);
        self
    }

    /// Render the `q` parameter, e.g.
    /// `name = 'quiz' and mimeType = '...' and 'folder' in parents and trashed = false`.
    pub fn render(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape(name)));
        }
        if let Some(mime) = &self.mime_type {
            clauses.push(format!("mimeType = '{}'", escape(mime)));
        }
        if let Some(parent) = &self.parent {
            clauses.push(format!("'{}' in parents", escape(parent)));
        }
        if let Some(trashed) = self.trashed {
            clauses.push(format!("trashed = {trashed}"));
        }
        clauses.join(" and ")
    }

    /// Evaluate the query against a file locally.
    pub fn matches(&self, file: &DriveFile) -> bool {
        self.name.as_ref().map_or(true, |n| &file.name == n)
            && self.mime_type.as_ref().map_or(true, |m| &file.mime_type == m)
            && self.parent.as_ref().map_or(true, |p| file.is_in(p))
            && self.trashed.map_or(true, |t| file.trashed == t)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

// -- Updates --------------------------------------------------------------------

/// Metadata patch for a file. Parent changes go in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub trashed: Option<bool>,
    pub add_parents: Vec<String>,
    pub remove_parents: Vec<String>,
}

impl FileUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn restore() -> Self {
        Self {
            trashed: Some(false),
            ..Self::default()
        }
    }

    /// Move into `folder_id`, detaching from every parent in `previous`.
    pub fn move_to(folder_id: impl Into<String>, previous: &[String]) -> Self {
        Self {
            add_parents: vec![folder_id.into()],
            remove_parents: previous.to_vec(),
            ..Self::default()
        }
    }

    /// Apply this patch to a file in place.
    pub fn apply(&self, file: &mut DriveFile) {
        if let Some(name) = &self.name {
            file.name = name.clone();
        }
        if let Some(trashed) = self.trashed {
            file.trashed = trashed;
        }
        file.parents.retain(|p| !self.remove_parents.contains(p));
        for parent in &self.add_parents {
            if !file.parents.contains(parent) {
                file.parents.push(parent.clone());
            }
        }
    }

    fn body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), serde_json::Value::String(name.clone()));
        }
        if let Some(trashed) = self.trashed {
            body.insert("trashed".into(), serde_json::Value::Bool(trashed));
        }
        serde_json::Value::Object(body)
    }
}

// -- Client ---------------------------------------------------------------------

/// Client for Drive file metadata.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl DriveClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Search the user's Drive.
    ///
    /// Calls `GET {base_url}/drive/v3/files?q={query}&spaces=drive&fields=...`.
    pub async fn list(&self, query: &FileQuery) -> Result<Vec<DriveFile>, GoogleApiError> {
        let endpoint = "GET /drive/v3/files";
        let url = format!("{}{}", self.base_url, API_PREFIX);
        let fields = format!("files({FILE_FIELDS})");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", query.render().as_str()),
                ("spaces", "drive"),
                ("fields", fields.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let list: FileList = read_json(resp, endpoint).await?;
        Ok(list.files)
    }

    /// Fetch metadata for one file. Returns `None` on 404.
    ///
    /// Calls `GET {base_url}/drive/v3/files/{file_id}?fields=...`.
    pub async fn get(&self, file_id: &str) -> Result<Option<DriveFile>, GoogleApiError> {
        let endpoint = format!("GET /drive/v3/files/{file_id}");
        let url = format!("{}{}/{file_id}", self.base_url, API_PREFIX);

        let resp = self
            .http
            .get(&url)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        read_json(resp, &endpoint).await.map(Some)
    }

    /// Create a folder, optionally inside `parent`.
    ///
    /// Calls `POST {base_url}/drive/v3/files`.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<DriveFile, GoogleApiError> {
        let endpoint = "POST /drive/v3/files";
        let url = format!("{}{}", self.base_url, API_PREFIX);
        let body = NewFile {
            name,
            mime_type: FOLDER_MIME,
            parents: parent.map(|p| vec![p]),
        };

        let resp = self
            .http
            .post(&url)
            .query(&[("fields", FILE_FIELDS)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        read_json(resp, endpoint).await
    }

    /// Patch file metadata.
    ///
    /// Calls `PATCH {base_url}/drive/v3/files/{file_id}` with `addParents` /
    /// `removeParents` query parameters when moving.
    pub async fn update(
        &self,
        file_id: &str,
        update: &FileUpdate,
    ) -> Result<DriveFile, GoogleApiError> {
        let endpoint = format!("PATCH /drive/v3/files/{file_id}");
        let url = format!("{}{}/{file_id}", self.base_url, API_PREFIX);

        let mut params = vec![("fields".to_string(), FILE_FIELDS.to_string())];
        if !update.add_parents.is_empty() {
            params.push(("addParents".into(), update.add_parents.join(",")));
        }
        if !update.remove_parents.is_empty() {
            params.push(("removeParents".into(), update.remove_parents.join(",")));
        }

        let resp = self
            .http
            .patch(&url)
            .query(&params)
            .json(&update.body())
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        read_json(resp, &endpoint).await
    }
}
