//! # Publish Subcommand
//!
//! Turns a validated quiz source into a Google Form in quiz mode and files
//! it in the study folder in Drive.
//!
//! The form is keyed by the source file stem. Publishing the same source
//! twice updates one form in place: its items are cleared and rebuilt. A
//! form of that name sitting in the trash is restored rather than
//! duplicated.
//!
//! ## Failure handling
//!
//! Steps that would leave a wrong or duplicate form abort the publish:
//! looking up the existing form, creating a new one, clearing and
//! re-titling it, and inserting a question (after one retry without
//! grading). Everything else (instructions, evaluation block, response
//! settings, drive renames, folder placement) is logged and collected as a
//! warning so the form is still usable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use quizform_client::drive::{FileQuery, FileUpdate, FOLDER_MIME, FORM_MIME};
use quizform_client::forms::{self, Item, Request};
use quizform_client::{DriveService, FormService, GoogleApiConfig, GoogleApiError, GoogleClient};
use quizform_schema::{EvaluationQuestion, Question, QuizDocument, Settings};

use crate::receipt::Receipt;
use crate::settings::PublishSettings;
use crate::validate::load_checked;
use crate::{form_name, quiz_path, EXIT_FAILURE, EXIT_MALFORMED, EXIT_OK};

/// Points awarded for a correct answer.
const POINTS_PER_QUESTION: u32 = 1;

/// Arguments for the `quizform publish` subcommand.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Quiz name, with or without the `.json` suffix.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Where to write the receipt (overrides the configured path).
    #[arg(long)]
    pub receipt: Option<PathBuf>,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub form_id: String,
    pub edit_url: String,
    pub public_url: String,
    pub total_questions: usize,
    /// Question count per section, in order of first appearance.
    pub sections: Vec<(String, usize)>,
    /// True when an existing form was rebuilt rather than created.
    pub updated: bool,
    /// Steps that failed without aborting the publish.
    pub warnings: Vec<String>,
    /// Things the user has to finish by hand in the form editor.
    pub notices: Vec<String>,
}

/// A publish that had to stop.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to look up existing form '{name}': {source}")]
    Lookup {
        name: String,
        source: GoogleApiError,
    },

    #[error("failed to create form: {0}")]
    CreateForm(#[source] GoogleApiError),

    #[error("failed to prepare form {form_id}: {source}")]
    Prepare {
        form_id: String,
        source: GoogleApiError,
    },

    #[error("failed to add question {id} to form {form_id}: {source}")]
    Question {
        form_id: String,
        id: String,
        source: GoogleApiError,
    },
}

/// Drives one publish against a pair of services.
pub struct Publisher<'a, F, D> {
    forms: &'a F,
    drive: &'a D,
    settings: &'a PublishSettings,
    folder: Option<String>,
    folder_searched: bool,
    warnings: Vec<String>,
    notices: Vec<String>,
}

impl<'a, F: FormService, D: DriveService> Publisher<'a, F, D> {
    pub fn new(forms: &'a F, drive: &'a D, settings: &'a PublishSettings) -> Self {
        Self {
            forms,
            drive,
            settings,
            folder: None,
            folder_searched: false,
            warnings: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Publish `doc` as the form called `form_name`.
    pub async fn publish(
        mut self,
        doc: &QuizDocument,
        form_name: &str,
    ) -> Result<PublishOutcome, PublishError> {
        let title = doc.metadata.title.joined(" ");
        let description = doc.metadata.description.joined("\n");

        let existing = self.find_existing(form_name).await?;
        let updated = existing.is_some();
        let (form_id, mut index) = match existing {
            Some(form_id) => {
                tracing::info!(form_id = %form_id, form_name, "updating existing form");
                let index = self
                    .prepare_existing(&form_id, form_name, &title, &description)
                    .await?;
                (form_id, index)
            }
            None => {
                tracing::info!(form_name, "creating new form");
                self.create_new(form_name, &title, &description).await?
            }
        };

        if let Some(text) = doc.instructions_text() {
            index = self.add_instructions(&form_id, text, index).await;
        }

        tracing::info!(count = doc.questions.len(), "adding questions");
        for question in &doc.questions {
            index = self.add_question(&form_id, question, index).await?;
        }

        let evaluation = doc.evaluation_questions();
        for (i, eq) in evaluation.iter().enumerate() {
            index = self.add_evaluation(&form_id, i + 1, eq, index).await;
        }

        if let Some(settings) = doc.settings.as_ref().filter(|s| !s.is_empty()) {
            self.apply_settings(&form_id, settings).await;
        }

        self.organise(&form_id).await;

        tracing::info!(
            form_id = %form_id,
            items = index,
            warnings = self.warnings.len(),
            "publish complete"
        );

        Ok(PublishOutcome {
            edit_url: forms::edit_url(&form_id),
            public_url: forms::public_url(&form_id),
            form_id,
            total_questions: doc.questions.len(),
            sections: doc.section_counts(),
            updated,
            warnings: self.warnings,
            notices: self.notices,
        })
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    // -- Lookup ----------------------------------------------------------------

    /// Find the form to update: live in the folder, else in the trash.
    async fn find_existing(&mut self, form_name: &str) -> Result<Option<String>, PublishError> {
        let lookup = |source| PublishError::Lookup {
            name: form_name.to_string(),
            source,
        };

        if let Some(folder_id) = self.locate_folder().await.map_err(lookup)? {
            let query = FileQuery::new()
                .name(form_name)
                .mime_type(FORM_MIME)
                .in_folder(folder_id)
                .trashed(false);
            if let Some(file) = self.drive.find_files(&query).await.map_err(lookup)?.into_iter().next() {
                tracing::debug!(form_id = %file.id, "found form in folder");
                return Ok(Some(file.id));
            }
        }

        let trash = FileQuery::new()
            .name(form_name)
            .mime_type(FORM_MIME)
            .trashed(true);
        let Some(file) = self.drive.find_files(&trash).await.map_err(lookup)?.into_iter().next() else {
            return Ok(None);
        };

        match self.drive.update_file(&file.id, &FileUpdate::restore()).await {
            Ok(_) => {
                tracing::info!(form_id = %file.id, "restored form from trash");
                Ok(Some(file.id))
            }
            Err(e) => {
                self.warn(format!(
                    "could not restore trashed form {}, creating a new one: {e}",
                    file.id
                ));
                Ok(None)
            }
        }
    }

    /// Id of the study folder if it exists, restoring a trashed one of the
    /// same name. Searches at most once per run.
    async fn locate_folder(&mut self) -> Result<Option<String>, GoogleApiError> {
        if self.folder_searched {
            return Ok(self.folder.clone());
        }
        self.folder_searched = true;

        let settings = self.settings;
        if let Some(id) = &settings.folder_id {
            match self.drive.get_file(id).await? {
                Some(f) if f.mime_type == FOLDER_MIME && !f.trashed => {
                    self.folder = Some(f.id);
                    return Ok(self.folder.clone());
                }
                _ => self.warn(format!(
                    "configured folder {id} not found, searching for '{}'",
                    settings.folder_name
                )),
            }
        }

        let live = FileQuery::new()
            .name(settings.folder_name.as_str())
            .mime_type(FOLDER_MIME)
            .trashed(false);
        if let Some(folder) = self.drive.find_files(&live).await?.into_iter().next() {
            self.folder = Some(folder.id);
            return Ok(self.folder.clone());
        }

        let trash = FileQuery::new()
            .name(settings.folder_name.as_str())
            .mime_type(FOLDER_MIME)
            .trashed(true);
        if let Some(folder) = self.drive.find_files(&trash).await?.into_iter().next() {
            match self.drive.update_file(&folder.id, &FileUpdate::restore()).await {
                Ok(_) => {
                    tracing::info!(folder_id = %folder.id, "restored study folder from trash");
                    self.folder = Some(folder.id);
                }
                Err(e) => self.warn(format!(
                    "could not restore trashed folder {}, creating a new one: {e}",
                    folder.id
                )),
            }
        }
        Ok(self.folder.clone())
    }

    // -- Form setup ------------------------------------------------------------

    /// Clear an existing form and reset its header. Returns the next index.
    async fn prepare_existing(
        &mut self,
        form_id: &str,
        form_name: &str,
        title: &str,
        description: &str,
    ) -> Result<usize, PublishError> {
        self.rename_file(form_id, form_name).await;

        let prepare = |source| PublishError::Prepare {
            form_id: form_id.to_string(),
            source,
        };
        let form = self.forms.get_form(form_id).await.map_err(prepare)?;

        // Deleting index 0 repeatedly empties the form in one batch.
        let mut requests: Vec<Request> = form.items.iter().map(|_| Request::delete_item(0)).collect();
        requests.push(Request::update_title_and_description(title, description.to_string()));
        requests.push(Request::enable_quiz());
        self.forms.batch_update(form_id, &requests).await.map_err(prepare)?;

        tracing::debug!(removed = form.items.len(), "cleared existing items");
        Ok(0)
    }

    /// Create the form and set its header. Returns the id and next index.
    async fn create_new(
        &mut self,
        form_name: &str,
        title: &str,
        description: &str,
    ) -> Result<(String, usize), PublishError> {
        let form = self
            .forms
            .create_form(title)
            .await
            .map_err(PublishError::CreateForm)?;
        let form_id = form.form_id;
        tracing::info!(form_id = %form_id, "form created");

        let header = [
            Request::update_title_and_description(title, description.to_string()),
            Request::enable_quiz(),
        ];
        self.forms
            .batch_update(&form_id, &header)
            .await
            .map_err(|source| PublishError::Prepare {
                form_id: form_id.clone(),
                source,
            })?;

        self.rename_file(&form_id, form_name).await;

        let remaining = match self.forms.get_form(&form_id).await {
            Ok(form) => form.items.len(),
            Err(e) => {
                self.warn(format!("could not inspect new form for default items: {e}"));
                0
            }
        };
        if remaining == 0 {
            return Ok((form_id, 0));
        }

        let deletes: Vec<Request> = (0..remaining).map(|_| Request::delete_item(0)).collect();
        match self.forms.batch_update(&form_id, &deletes).await {
            Ok(_) => Ok((form_id, 0)),
            Err(e) => {
                self.warn(format!("could not remove default item: {e}"));
                Ok((form_id, remaining))
            }
        }
    }

    async fn rename_file(&mut self, form_id: &str, form_name: &str) {
        if let Err(e) = self.drive.update_file(form_id, &FileUpdate::rename(form_name)).await {
            self.warn(format!("could not rename drive file to '{form_name}': {e}"));
        }
    }

    // -- Items -----------------------------------------------------------------

    async fn add_instructions(&mut self, form_id: &str, text: String, index: usize) -> usize {
        let request = Request::create_item(Item::text(text), 0);
        match self.forms.batch_update(form_id, &[request]).await {
            Ok(_) => index + 1,
            Err(e) => {
                self.warn(format!("could not add instructions: {e}"));
                index
            }
        }
    }

    /// Append one graded question, falling back to an ungraded one.
    async fn add_question(
        &mut self,
        form_id: &str,
        question: &Question,
        index: usize,
    ) -> Result<usize, PublishError> {
        let title = format!("{}: {}", question.id, question.question.joined(" "));
        let item = Item::radio(title, &question.option_labels(), true)
            .with_description(format!("Seção: {}", question.section.joined(" ")));

        if let Some(correct) = question.correct_label() {
            let graded = item.clone().with_grading(POINTS_PER_QUESTION, correct);
            match self
                .forms
                .batch_update(form_id, &[Request::create_item(graded, index)])
                .await
            {
                Ok(_) => return Ok(index + 1),
                Err(e) => self.warn(format!(
                    "question {}: grading rejected, added without grading: {e}",
                    question.id
                )),
            }
        }

        self.forms
            .batch_update(form_id, &[Request::create_item(item, index)])
            .await
            .map_err(|source| PublishError::Question {
                form_id: form_id.to_string(),
                id: question.id.to_string(),
                source,
            })?;
        Ok(index + 1)
    }

    async fn add_evaluation(
        &mut self,
        form_id: &str,
        number: usize,
        question: &EvaluationQuestion,
        index: usize,
    ) -> usize {
        let title = format!("Avaliação {number}: {}", question.question);
        let item = Item::radio(title, &question.options, false);
        match self
            .forms
            .batch_update(form_id, &[Request::create_item(item, index)])
            .await
        {
            Ok(_) => index + 1,
            Err(e) => {
                self.warn(format!("could not add evaluation question {number}: {e}"));
                index
            }
        }
    }

    // -- Settings and placement ------------------------------------------------

    async fn apply_settings(&mut self, form_id: &str, settings: &Settings) {
        let collect = settings.effective_collect_email();
        match self
            .forms
            .batch_update(form_id, &[Request::collect_email(collect)])
            .await
        {
            Ok(_) => tracing::debug!(collect_email = collect, "response settings applied"),
            Err(e) => {
                self.warn(format!("could not apply response settings: {e}"));
                return;
            }
        }

        if settings.needs_single_response_limit() {
            self.notices.push(format!(
                "Enable \"Limit to 1 response\" in the form settings: {}",
                forms::edit_url(form_id)
            ));
        }
    }

    /// File the form in the study folder, creating the folder if needed.
    async fn organise(&mut self, form_id: &str) {
        let folder_id = match self.locate_folder().await {
            Ok(Some(id)) => id,
            Ok(None) => match self.drive.create_folder(&self.settings.folder_name).await {
                Ok(folder) => {
                    tracing::info!(folder_id = %folder.id, "created study folder");
                    self.folder = Some(folder.id.clone());
                    folder.id
                }
                Err(e) => {
                    self.warn(format!(
                        "could not create folder '{}': {e}",
                        self.settings.folder_name
                    ));
                    return;
                }
            },
            Err(e) => {
                self.warn(format!("could not find folder '{}': {e}", self.settings.folder_name));
                return;
            }
        };

        let parents = match self.drive.get_file(form_id).await {
            Ok(Some(file)) if file.is_in(&folder_id) => {
                tracing::debug!(folder_id = %folder_id, "form already in folder");
                return;
            }
            Ok(Some(file)) => file.parents,
            Ok(None) => Vec::new(),
            Err(e) => {
                self.warn(format!("could not read parents of form {form_id}: {e}"));
                return;
            }
        };

        let update = FileUpdate::move_to(folder_id.as_str(), &parents);
        match self.drive.update_file(form_id, &update).await {
            Ok(_) => tracing::info!(folder_id = %folder_id, "moved form into folder"),
            Err(e) => self.warn(format!(
                "could not move form into '{}': {e}",
                self.settings.folder_name
            )),
        }
    }
}

/// Publish `doc` with the given services.
pub async fn publish<F: FormService, D: DriveService>(
    forms: &F,
    drive: &D,
    settings: &PublishSettings,
    doc: &QuizDocument,
    form_name: &str,
) -> Result<PublishOutcome, PublishError> {
    Publisher::new(forms, drive, settings).publish(doc, form_name).await
}

/// Publish the checked source `value` read from `path` and write the
/// receipt.
///
/// `value` must come from [`load_checked`]. Returns the exit code; remote
/// failures come back as `Err`.
pub async fn publish_source<F: FormService, D: DriveService>(
    forms: &F,
    drive: &D,
    settings: &PublishSettings,
    path: &Path,
    value: Value,
    receipt_path: &Path,
) -> Result<u8> {
    let name = form_name(path);
    let doc = match QuizDocument::from_value(value, &name) {
        Ok(doc) => doc,
        Err(e) => {
            println!("{e}");
            return Ok(EXIT_MALFORMED);
        }
    };

    let title = doc.metadata.title.joined(" ");
    println!("Publishing '{name}': {title}");

    let outcome = publish(forms, drive, settings, &doc, &name)
        .await
        .with_context(|| format!("failed to publish '{name}'"))?;

    print_summary(&title, &outcome);

    let receipt = Receipt {
        name: &name,
        title: &title,
        source: path,
        outcome: &outcome,
    };
    match receipt.write(receipt_path, chrono::Local::now()) {
        Ok(()) => tracing::info!(path = %receipt_path.display(), "receipt written"),
        Err(e) => tracing::warn!(path = %receipt_path.display(), "could not write receipt: {e}"),
    }

    Ok(EXIT_OK)
}

fn print_summary(title: &str, outcome: &PublishOutcome) {
    let verb = if outcome.updated { "updated" } else { "created" };
    println!("Form {verb}: {title}");
    println!("  Form ID:         {}", outcome.form_id);
    println!("  Total questions: {}", outcome.total_questions);
    println!("  Edit link:       {}", outcome.edit_url);
    println!("  Public link:     {}", outcome.public_url);
    println!("  Sections:");
    for (section, count) in &outcome.sections {
        println!("    - {section}: {count} questions");
    }
    for notice in &outcome.notices {
        println!("NOTE: {notice}");
    }
    for warning in &outcome.warnings {
        println!("WARN: {warning}");
    }
}

/// Execute the publish subcommand against the live APIs.
pub async fn run_publish(args: &PublishArgs, settings: &PublishSettings) -> Result<u8> {
    let path = quiz_path(&args.name, &settings.forms_dir);
    let receipt_path = args
        .receipt
        .clone()
        .unwrap_or_else(|| settings.receipt_path.clone());

    // Check the source before asking for credentials.
    let value = match load_checked(&path) {
        Ok(value) => value,
        Err(code) => return Ok(code),
    };

    let config = match GoogleApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("authentication error: {e}");
            return Ok(EXIT_FAILURE);
        }
    };
    let client = GoogleClient::new(config).context("failed to build Google API client")?;

    publish_source(client.forms(), client.drive(), settings, &path, value, &receipt_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizform_client::forms::Form;
    use quizform_client::memory::{Call, Faults, InMemoryGoogle, ROOT_FOLDER};
    use serde_json::json;

    fn quiz() -> QuizDocument {
        let value = json!({
            "metadata": {
                "title": "Pronouns Quiz",
                "description": ["Practice pronouns.", "Ten minutes."],
                "subject": "Portuguese",
                "grade": "6th",
                "topic": "Pronouns"
            },
            "content": {"instructions": ["Read carefully.", "One answer each."]},
            "questions": [
                {"id": 1, "section": "Personal", "question": "Which is a pronoun?", "options": ["ele", "casa"], "correct_answer": 0},
                {"id": 2, "section": "Possessive", "question": "Pick the possessive.", "options": ["meu", "mim", "me"], "correct_answer": 0},
                {"id": 3, "section": "Personal", "question": "Plural of eu?", "options": ["nós", "vós"], "correct_answer": 0}
            ]
        });
        QuizDocument::from_value(value, "pronouns").unwrap()
    }

    fn titles(form: &Form) -> Vec<String> {
        form.items.iter().map(|i| i.title.clone().unwrap_or_default()).collect()
    }

    async fn run(google: &InMemoryGoogle, doc: &QuizDocument) -> Result<PublishOutcome, PublishError> {
        publish(google, google, &PublishSettings::default(), doc, "pronouns").await
    }

    #[tokio::test]
    async fn creates_form_with_items_in_order() {
        let google = InMemoryGoogle::new();
        let outcome = run(&google, &quiz()).await.unwrap();

        assert!(!outcome.updated);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(
            outcome.sections,
            vec![("Personal".to_string(), 2), ("Possessive".to_string(), 1)]
        );
        assert_eq!(outcome.edit_url, format!("https://docs.google.com/forms/d/{}/edit", outcome.form_id));

        let form = google.form(&outcome.form_id).unwrap();
        assert_eq!(form.info.title, "Pronouns Quiz");
        assert_eq!(form.info.description.as_deref(), Some("Practice pronouns.\nTen minutes."));
        assert_eq!(
            form.settings.and_then(|s| s.quiz_settings).map(|q| q.is_quiz),
            Some(true)
        );
        assert_eq!(
            titles(&google.form(&outcome.form_id).unwrap()),
            vec![
                "Read carefully. One answer each.",
                "1: Which is a pronoun?",
                "2: Pick the possessive.",
                "3: Plural of eu?",
            ]
        );
        assert!(form.items[1..].iter().all(Item::is_graded));
        assert_eq!(form.items[1].description.as_deref(), Some("Seção: Personal"));
    }

    #[tokio::test]
    async fn new_form_is_named_after_source_and_filed_in_folder() {
        let google = InMemoryGoogle::new();
        let outcome = run(&google, &quiz()).await.unwrap();

        let file = google.file(&outcome.form_id).unwrap();
        assert_eq!(file.name, "pronouns");

        let folders = google.files_matching(&FileQuery::new().mime_type(FOLDER_MIME));
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name, "Personal study assistant");
        assert_eq!(file.parents, vec![folders[0].id.clone()]);
    }

    #[tokio::test]
    async fn question_index_is_tracked_without_refetching() {
        let google = InMemoryGoogle::new();
        let outcome = run(&google, &quiz()).await.unwrap();

        let indices: Vec<usize> = google
            .batches(&outcome.form_id)
            .into_iter()
            .flatten()
            .filter_map(|r| match r {
                Request::CreateItem { location, .. } => Some(location.index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);

        // One get after create (default-item check), none per question.
        let gets = google
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::GetForm { .. }))
            .count();
        assert_eq!(gets, 1);
    }

    #[tokio::test]
    async fn default_item_is_removed_from_new_form() {
        let google = InMemoryGoogle::new().with_default_item();
        let outcome = run(&google, &quiz()).await.unwrap();
        let form = google.form(&outcome.form_id).unwrap();
        assert_eq!(form.items.len(), 4);
        assert_eq!(titles(&form)[0], "Read carefully. One answer each.");
    }

    #[tokio::test]
    async fn republish_updates_existing_form_in_place() {
        let google = InMemoryGoogle::new();
        let first = run(&google, &quiz()).await.unwrap();
        let second = run(&google, &quiz()).await.unwrap();

        assert!(second.updated);
        assert_eq!(first.form_id, second.form_id);
        assert_eq!(google.form(&second.form_id).unwrap().items.len(), 4);

        let creates = google
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateForm { .. }))
            .count();
        assert_eq!(creates, 1);
    }

    #[tokio::test]
    async fn existing_items_are_cleared_in_one_batch() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Personal study assistant");
        let old = vec![Item::text("old 1"), Item::text("old 2"), Item::text("old 3")];
        let form_id = google.add_form("pronouns", old, &[folder.as_str()], false);

        let outcome = run(&google, &quiz()).await.unwrap();
        assert_eq!(outcome.form_id, form_id);

        let first_batch = &google.batches(&form_id)[0];
        let deletes = first_batch
            .iter()
            .filter(|r| matches!(r, Request::DeleteItem { .. }))
            .count();
        assert_eq!(deletes, 3);
        assert!(!titles(&google.form(&form_id).unwrap()).iter().any(|t| t.starts_with("old")));
    }

    #[tokio::test]
    async fn trashed_form_is_restored_and_moved() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Personal study assistant");
        let form_id = google.add_form("pronouns", vec![], &[ROOT_FOLDER], true);

        let outcome = run(&google, &quiz()).await.unwrap();
        assert!(outcome.updated);
        assert_eq!(outcome.form_id, form_id);

        let file = google.file(&form_id).unwrap();
        assert!(!file.trashed);
        assert_eq!(file.parents, vec![folder]);
    }

    #[tokio::test]
    async fn configured_folder_id_is_used_when_valid() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Renamed in Drive");
        let settings = PublishSettings {
            folder_id: Some(folder.clone()),
            ..PublishSettings::default()
        };
        let outcome = publish(&google, &google, &settings, &quiz(), "pronouns").await.unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(google.file(&outcome.form_id).unwrap().parents, vec![folder]);
    }

    #[tokio::test]
    async fn stale_folder_id_falls_back_to_name_with_warning() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Personal study assistant");
        let settings = PublishSettings {
            folder_id: Some("gone".into()),
            ..PublishSettings::default()
        };
        let outcome = publish(&google, &google, &settings, &quiz(), "pronouns").await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("gone"));
        assert_eq!(google.file(&outcome.form_id).unwrap().parents, vec![folder]);
    }

    #[tokio::test]
    async fn trashed_folder_is_restored_instead_of_duplicated() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Personal study assistant");
        let trash = FileUpdate {
            trashed: Some(true),
            ..FileUpdate::default()
        };
        google.update_file(&folder, &trash).await.unwrap();

        let outcome = run(&google, &quiz()).await.unwrap();
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

        let folders = google.files_matching(
            &FileQuery::new()
                .name("Personal study assistant")
                .mime_type(FOLDER_MIME),
        );
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, folder);
        assert!(!folders[0].trashed);
        assert_eq!(google.file(&outcome.form_id).unwrap().parents, vec![folder]);
        assert!(!google.calls().iter().any(|c| matches!(c, Call::CreateFolder { .. })));
    }

    #[tokio::test]
    async fn folder_restore_failure_creates_new_folder_with_warning() {
        let google = InMemoryGoogle::new();
        let folder = google.add_folder("Personal study assistant");
        let trash = FileUpdate {
            trashed: Some(true),
            ..FileUpdate::default()
        };
        google.update_file(&folder, &trash).await.unwrap();
        google.set_faults(Faults {
            restore_file: true,
            ..Faults::default()
        });

        let outcome = run(&google, &quiz()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("could not restore trashed folder"));

        let live = google.files_matching(
            &FileQuery::new()
                .name("Personal study assistant")
                .mime_type(FOLDER_MIME)
                .trashed(false),
        );
        assert_eq!(live.len(), 1);
        assert_ne!(live[0].id, folder);
        assert_eq!(google.file(&outcome.form_id).unwrap().parents, vec![live[0].id.clone()]);
    }

    #[tokio::test]
    async fn rejected_grading_falls_back_to_plain_question() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            graded_items: true,
            ..Faults::default()
        });
        let outcome = run(&google, &quiz()).await.unwrap();

        assert_eq!(outcome.warnings.len(), 3);
        let form = google.form(&outcome.form_id).unwrap();
        assert_eq!(form.items.len(), 4);
        assert!(!form.items.iter().any(Item::is_graded));
    }

    #[tokio::test]
    async fn failed_fallback_aborts() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            item_title_prefix: Some("2:".into()),
            ..Faults::default()
        });
        let err = run(&google, &quiz()).await.unwrap_err();
        match err {
            PublishError::Question { id, .. } => assert_eq!(id, "2"),
            other => panic!("expected Question error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn form_creation_failure_is_fatal() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            create_form: true,
            ..Faults::default()
        });
        assert!(matches!(run(&google, &quiz()).await, Err(PublishError::CreateForm(_))));
    }

    #[tokio::test]
    async fn lookup_failure_is_fatal() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            find_files: true,
            ..Faults::default()
        });
        assert!(matches!(run(&google, &quiz()).await, Err(PublishError::Lookup { .. })));
        assert!(!google.calls().iter().any(|c| matches!(c, Call::CreateForm { .. })));
    }

    #[tokio::test]
    async fn folder_failures_are_warnings() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            create_folder: true,
            ..Faults::default()
        });
        let outcome = run(&google, &quiz()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("could not create folder"));
        assert_eq!(google.file(&outcome.form_id).unwrap().parents, vec![ROOT_FOLDER]);
    }

    #[tokio::test]
    async fn move_failure_is_a_warning() {
        let google = InMemoryGoogle::new();
        google.add_folder("Personal study assistant");
        google.set_faults(Faults {
            move_file: true,
            ..Faults::default()
        });
        let outcome = run(&google, &quiz()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("could not move"));
    }

    #[tokio::test]
    async fn instruction_failure_keeps_question_positions() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            item_title_prefix: Some("Read".into()),
            ..Faults::default()
        });
        let outcome = run(&google, &quiz()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(
            titles(&google.form(&outcome.form_id).unwrap()),
            vec!["1: Which is a pronoun?", "2: Pick the possessive.", "3: Plural of eu?"]
        );
    }

    #[tokio::test]
    async fn evaluation_defaults_are_appended_ungraded() {
        let google = InMemoryGoogle::new();
        let mut value = serde_json::to_value(quiz()).unwrap();
        value["evaluation"] = json!({"include_evaluation": true});
        let doc = QuizDocument::from_value(value, "pronouns").unwrap();

        let outcome = run(&google, &doc).await.unwrap();
        let form = google.form(&outcome.form_id).unwrap();
        assert_eq!(form.items.len(), 7);
        let tail = &form.items[4..];
        assert!(tail.iter().all(|i| !i.is_graded()));
        assert!(tail[0].title.as_deref().unwrap_or_default().starts_with("Avaliação 1: Como você avalia"));
        assert!(tail[2].title.as_deref().unwrap_or_default().starts_with("Avaliação 3: "));
        assert!(tail
            .iter()
            .all(|i| i.question_item.as_ref().is_some_and(|q| !q.question.required)));
    }

    #[tokio::test]
    async fn login_requirement_forces_email_and_adds_notice() {
        let google = InMemoryGoogle::new();
        let mut value = serde_json::to_value(quiz()).unwrap();
        value["settings"] = json!({"require_login": true, "collect_email": false});
        let doc = QuizDocument::from_value(value, "pronouns").unwrap();

        let outcome = run(&google, &doc).await.unwrap();
        let form = google.form(&outcome.form_id).unwrap();
        assert_eq!(form.settings.and_then(|s| s.collect_email), Some(true));
        assert_eq!(outcome.notices.len(), 1);
        assert!(outcome.notices[0].contains(&outcome.edit_url));
    }

    #[tokio::test]
    async fn empty_settings_block_sends_no_settings_request() {
        let google = InMemoryGoogle::new();
        let mut value = serde_json::to_value(quiz()).unwrap();
        value["settings"] = json!({});
        let doc = QuizDocument::from_value(value, "pronouns").unwrap();

        let outcome = run(&google, &doc).await.unwrap();
        let collect_requests = google
            .batches(&outcome.form_id)
            .into_iter()
            .flatten()
            .filter(|r| {
                matches!(r, Request::UpdateSettings { update_mask, .. } if update_mask == "collectEmail")
            })
            .count();
        assert_eq!(collect_requests, 0);
        assert!(outcome.notices.is_empty());
        assert_eq!(google.form(&outcome.form_id).unwrap().settings.and_then(|s| s.collect_email), None);
    }

    #[tokio::test]
    async fn settings_failure_is_a_warning() {
        let google = InMemoryGoogle::new();
        google.set_faults(Faults {
            update_mask: Some("collectEmail".into()),
            ..Faults::default()
        });
        let mut value = serde_json::to_value(quiz()).unwrap();
        value["settings"] = json!({"collect_email": true});
        let doc = QuizDocument::from_value(value, "pronouns").unwrap();

        let outcome = run(&google, &doc).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.notices.is_empty());
    }
}
