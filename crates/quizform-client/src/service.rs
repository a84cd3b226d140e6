//! Capability traits over the Forms and Drive APIs.
//!
//! The publish workflow is written against these traits rather than the
//! HTTP clients so it can run against [`crate::memory::InMemoryGoogle`]
//! in tests. The live clients implement them by delegation.

use std::future::Future;

use crate::drive::{DriveClient, DriveFile, FileQuery, FileUpdate};
use crate::error::GoogleApiError;
use crate::forms::{BatchUpdateResponse, Form, FormsClient, Request};

/// Form creation, retrieval and batch editing.
pub trait FormService: Send + Sync {
    /// Create a form with only a title.
    fn create_form(&self, title: &str)
        -> impl Future<Output = Result<Form, GoogleApiError>> + Send;

    /// Fetch a form with its items.
    fn get_form(&self, form_id: &str)
        -> impl Future<Output = Result<Form, GoogleApiError>> + Send;

    /// Apply `requests` in order, all or nothing.
    fn batch_update(
        &self,
        form_id: &str,
        requests: &[Request],
    ) -> impl Future<Output = Result<BatchUpdateResponse, GoogleApiError>> + Send;
}

/// File search and metadata edits in the user's Drive.
pub trait DriveService: Send + Sync {
    fn find_files(
        &self,
        query: &FileQuery,
    ) -> impl Future<Output = Result<Vec<DriveFile>, GoogleApiError>> + Send;

    /// `Ok(None)` when the file does not exist.
    fn get_file(
        &self,
        file_id: &str,
    ) -> impl Future<Output = Result<Option<DriveFile>, GoogleApiError>> + Send;

    fn create_folder(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<DriveFile, GoogleApiError>> + Send;

    fn update_file(
        &self,
        file_id: &str,
        update: &FileUpdate,
    ) -> impl Future<Output = Result<DriveFile, GoogleApiError>> + Send;
}

impl FormService for FormsClient {
    async fn create_form(&self, title: &str) -> Result<Form, GoogleApiError> {
        self.create(title).await
    }

    async fn get_form(&self, form_id: &str) -> Result<Form, GoogleApiError> {
        self.get(form_id).await
    }

    async fn batch_update(
        &self,
        form_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, GoogleApiError> {
        FormsClient::batch_update(self, form_id, requests).await
    }
}

impl DriveService for DriveClient {
    async fn find_files(&self, query: &FileQuery) -> Result<Vec<DriveFile>, GoogleApiError> {
        self.list(query).await
    }

    async fn get_file(&self, file_id: &str) -> Result<Option<DriveFile>, GoogleApiError> {
        self.get(file_id).await
    }

    async fn create_folder(&self, name: &str) -> Result<DriveFile, GoogleApiError> {
        DriveClient::create_folder(self, name, None).await
    }

    async fn update_file(
        &self,
        file_id: &str,
        update: &FileUpdate,
    ) -> Result<DriveFile, GoogleApiError> {
        self.update(file_id, update).await
    }
}
