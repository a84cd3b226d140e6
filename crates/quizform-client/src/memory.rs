//! In-memory Forms and Drive, for exercising the publish workflow without
//! network access.
//!
//! One [`InMemoryGoogle`] implements both [`FormService`] and
//! [`DriveService`] over shared state, so a form created through the Forms
//! side shows up as a Drive file the way it does in the real services.
//! Every call is recorded and individual operations can be made to fail
//! through [`Faults`].

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::drive::{DriveFile, FileQuery, FileUpdate, FOLDER_MIME, FORM_MIME};
use crate::error::GoogleApiError;
use crate::forms::{BatchUpdateResponse, Form, FormInfo, FormSettings, Item, Request};
use crate::service::{DriveService, FormService};

/// Parent id of files created outside any folder.
pub const ROOT_FOLDER: &str = "root";

/// Operations to fail on purpose.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub create_form: bool,
    pub get_form: bool,
    pub find_files: bool,
    pub create_folder: bool,
    /// Fail any file update that changes parents.
    pub move_file: bool,
    /// Fail any file update that renames.
    pub rename_file: bool,
    /// Fail any file update that takes a file out of the trash.
    pub restore_file: bool,
    /// Reject batches that create a graded question.
    pub graded_items: bool,
    /// Reject batches that create an item whose title starts with this.
    pub item_title_prefix: Option<String>,
    /// Reject batches containing an info/settings update with this mask.
    pub update_mask: Option<String>,
}

/// A call made against the fake, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateForm { title: String },
    GetForm { form_id: String },
    BatchUpdate { form_id: String, requests: Vec<Request> },
    FindFiles { query: String },
    GetFile { file_id: String },
    CreateFolder { name: String },
    UpdateFile { file_id: String, update: FileUpdate },
}

#[derive(Debug, Default)]
struct State {
    forms: BTreeMap<String, Form>,
    files: BTreeMap<String, DriveFile>,
    calls: Vec<Call>,
    faults: Faults,
    next_id: u64,
    default_item: bool,
}

impl State {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Shared in-memory Forms + Drive. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGoogle {
    state: Arc<Mutex<State>>,
}

impl InMemoryGoogle {
    pub fn new() -> Self {
        Self::default()
    }

    /// New forms start with one untitled text item, as some accounts do.
    pub fn with_default_item(self) -> Self {
        self.state.lock().default_item = true;
        self
    }

    pub fn set_faults(&self, faults: Faults) {
        self.state.lock().faults = faults;
    }

    /// Seed a folder and return its id.
    pub fn add_folder(&self, name: &str) -> String {
        let mut state = self.state.lock();
        let id = state.fresh_id("folder");
        state.files.insert(
            id.clone(),
            DriveFile {
                id: id.clone(),
                name: name.into(),
                mime_type: FOLDER_MIME.into(),
                parents: vec![ROOT_FOLDER.into()],
                trashed: false,
            },
        );
        id
    }

    /// Seed a form with `items` under `parents`, optionally trashed.
    pub fn add_form(&self, name: &str, items: Vec<Item>, parents: &[&str], trashed: bool) -> String {
        let mut state = self.state.lock();
        let id = state.fresh_id("form");
        let items = items
            .into_iter()
            .map(|mut item| {
                item.item_id = Some(state.fresh_id("item"));
                item
            })
            .collect();
        state.forms.insert(
            id.clone(),
            Form {
                form_id: id.clone(),
                info: FormInfo::new(name, None),
                settings: None,
                items,
                responder_uri: None,
                revision_id: None,
            },
        );
        state.files.insert(
            id.clone(),
            DriveFile {
                id: id.clone(),
                name: name.into(),
                mime_type: FORM_MIME.into(),
                parents: parents.iter().map(|p| p.to_string()).collect(),
                trashed,
            },
        );
        id
    }

    pub fn form(&self, form_id: &str) -> Option<Form> {
        self.state.lock().forms.get(form_id).cloned()
    }

    pub fn file(&self, file_id: &str) -> Option<DriveFile> {
        self.state.lock().files.get(file_id).cloned()
    }

    /// Files matching `query`, without recording a call.
    pub fn files_matching(&self, query: &FileQuery) -> Vec<DriveFile> {
        self.state
            .lock()
            .files
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Every batch sent to `form_id`, in order.
    pub fn batches(&self, form_id: &str) -> Vec<Vec<Request>> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::BatchUpdate { form_id: id, requests } if id == form_id => {
                    Some(requests.clone())
                }
                _ => None,
            })
            .collect()
    }
}

fn rejected(endpoint: &str, status: u16, body: &str) -> GoogleApiError {
    GoogleApiError::ApiError {
        endpoint: endpoint.into(),
        status,
        body: body.into(),
    }
}

fn check_faults(faults: &Faults, endpoint: &str, request: &Request) -> Result<(), GoogleApiError> {
    match request {
        Request::CreateItem { item, .. } => {
            if faults.graded_items && item.is_graded() {
                return Err(rejected(endpoint, 400, "grading not allowed"));
            }
            if let (Some(prefix), Some(title)) = (&faults.item_title_prefix, &item.title) {
                if title.starts_with(prefix.as_str()) {
                    return Err(rejected(endpoint, 400, "item rejected"));
                }
            }
        }
        Request::UpdateFormInfo { update_mask, .. } | Request::UpdateSettings { update_mask, .. } => {
            if faults.update_mask.as_deref() == Some(update_mask.as_str()) {
                return Err(rejected(endpoint, 400, "update rejected"));
            }
        }
        Request::DeleteItem { .. } => {}
    }
    Ok(())
}

fn apply_settings(target: &mut FormSettings, patch: &FormSettings) {
    if let Some(quiz) = &patch.quiz_settings {
        target.quiz_settings = Some(quiz.clone());
    }
    if let Some(collect) = patch.collect_email {
        target.collect_email = Some(collect);
    }
}

impl FormService for InMemoryGoogle {
    async fn create_form(&self, title: &str) -> Result<Form, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateForm {
            title: title.into(),
        });
        if state.faults.create_form {
            return Err(rejected("POST /v1/forms", 500, "backend error"));
        }

        let id = state.fresh_id("form");
        let mut items = Vec::new();
        if state.default_item {
            items.push(Item {
                item_id: Some(state.fresh_id("item")),
                ..Item::default()
            });
        }
        let form = Form {
            form_id: id.clone(),
            info: FormInfo {
                title: title.into(),
                description: None,
                document_title: Some(title.into()),
            },
            settings: None,
            items,
            responder_uri: Some(crate::forms::public_url(&id)),
            revision_id: Some("1".into()),
        };
        state.forms.insert(id.clone(), form.clone());
        state.files.insert(
            id.clone(),
            DriveFile {
                id,
                name: title.into(),
                mime_type: FORM_MIME.into(),
                parents: vec![ROOT_FOLDER.into()],
                trashed: false,
            },
        );
        Ok(form)
    }

    async fn get_form(&self, form_id: &str) -> Result<Form, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::GetForm {
            form_id: form_id.into(),
        });
        let endpoint = format!("GET /v1/forms/{form_id}");
        if state.faults.get_form {
            return Err(rejected(&endpoint, 500, "backend error"));
        }
        state
            .forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| rejected(&endpoint, 404, "form not found"))
    }

    async fn batch_update(
        &self,
        form_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::BatchUpdate {
            form_id: form_id.into(),
            requests: requests.to_vec(),
        });
        let endpoint = format!("POST /v1/forms/{form_id}:batchUpdate");

        let mut form = state
            .forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| rejected(&endpoint, 404, "form not found"))?;

        // Work on a copy so a failing request leaves the form untouched.
        let mut replies = Vec::with_capacity(requests.len());
        for request in requests {
            check_faults(&state.faults, &endpoint, request)?;
            match request {
                Request::CreateItem { item, location } => {
                    if location.index > form.items.len() {
                        return Err(rejected(&endpoint, 400, "index out of range"));
                    }
                    let mut item = item.clone();
                    let item_id = state.fresh_id("item");
                    item.item_id = Some(item_id.clone());
                    form.items.insert(location.index, item);
                    replies.push(serde_json::json!({"createItem": {"itemId": item_id}}));
                }
                Request::DeleteItem { location } => {
                    if location.index >= form.items.len() {
                        return Err(rejected(&endpoint, 400, "index out of range"));
                    }
                    form.items.remove(location.index);
                    replies.push(serde_json::json!({}));
                }
                Request::UpdateFormInfo { info, update_mask } => {
                    for field in update_mask.split(',') {
                        match field {
                            "title" => form.info.title = info.title.clone(),
                            "description" => form.info.description = info.description.clone(),
                            _ => {}
                        }
                    }
                    replies.push(serde_json::json!({}));
                }
                Request::UpdateSettings { settings, .. } => {
                    apply_settings(form.settings.get_or_insert_with(FormSettings::default), settings);
                    replies.push(serde_json::json!({}));
                }
            }
        }

        state.forms.insert(form_id.into(), form.clone());
        Ok(BatchUpdateResponse {
            replies,
            form: Some(form),
        })
    }
}

impl DriveService for InMemoryGoogle {
    async fn find_files(&self, query: &FileQuery) -> Result<Vec<DriveFile>, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::FindFiles {
            query: query.render(),
        });
        if state.faults.find_files {
            return Err(rejected("GET /drive/v3/files", 500, "backend error"));
        }
        Ok(state
            .files
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect())
    }

    async fn get_file(&self, file_id: &str) -> Result<Option<DriveFile>, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::GetFile {
            file_id: file_id.into(),
        });
        Ok(state.files.get(file_id).cloned())
    }

    async fn create_folder(&self, name: &str) -> Result<DriveFile, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateFolder { name: name.into() });
        if state.faults.create_folder {
            return Err(rejected("POST /drive/v3/files", 403, "insufficient permissions"));
        }
        let id = state.fresh_id("folder");
        let folder = DriveFile {
            id: id.clone(),
            name: name.into(),
            mime_type: FOLDER_MIME.into(),
            parents: vec![ROOT_FOLDER.into()],
            trashed: false,
        };
        state.files.insert(id, folder.clone());
        Ok(folder)
    }

    async fn update_file(
        &self,
        file_id: &str,
        update: &FileUpdate,
    ) -> Result<DriveFile, GoogleApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::UpdateFile {
            file_id: file_id.into(),
            update: update.clone(),
        });
        let endpoint = format!("PATCH /drive/v3/files/{file_id}");
        let moving = !update.add_parents.is_empty() || !update.remove_parents.is_empty();
        let restoring = update.trashed == Some(false);
        if (state.faults.move_file && moving)
            || (state.faults.rename_file && update.name.is_some())
            || (state.faults.restore_file && restoring)
        {
            return Err(rejected(&endpoint, 403, "insufficient permissions"));
        }

        let file = state
            .files
            .get_mut(file_id)
            .ok_or_else(|| rejected(&endpoint, 404, "file not found"))?;
        update.apply(file);
        Ok(file.clone())
    }
}
