//! Typed client for the Forms REST API (v1).
//!
//! Base URL: `forms.googleapis.com`
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/v1/forms` | Create form (title only) |
//! | GET    | `/v1/forms/{formId}` | Get form with items |
//! | POST   | `/v1/forms/{formId}:batchUpdate` | Apply item/info/settings requests |
//!
//! The API only accepts a title on creation; description, quiz mode and
//! every item arrive later through `batchUpdate`.

use serde::{Deserialize, Serialize};

use crate::error::{read_json, GoogleApiError};

/// API version path segment for the Forms service.
const API_PREFIX: &str = "v1/forms";

// -- Form resource ------------------------------------------------------------

/// A form as returned by the Forms API.
///
/// Unknown fields are ignored; `items` is absent on an empty form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub form_id: String,
    #[serde(default)]
    pub info: FormInfo,
    #[serde(default)]
    pub settings: Option<FormSettings>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub responder_uri: Option<String>,
    #[serde(default)]
    pub revision_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
}

impl FormInfo {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
            document_title: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_settings: Option<QuizSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_email: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default)]
    pub is_quiz: bool,
}

// -- Items ----------------------------------------------------------------------

/// One entry of a form: a question, or a block of static text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_item: Option<QuestionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_item: Option<TextItem>,
}

impl Item {
    /// A static text block.
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            text_item: Some(TextItem {}),
            ..Self::default()
        }
    }

    /// A single-answer (radio) question.
    pub fn radio(title: impl Into<String>, options: &[String], required: bool) -> Self {
        Self {
            title: Some(title.into()),
            question_item: Some(QuestionItem {
                question: Question {
                    question_id: None,
                    required,
                    choice_question: Some(ChoiceQuestion {
                        kind: ChoiceType::Radio,
                        options: options
                            .iter()
                            .map(|value| ChoiceOption {
                                value: value.clone(),
                            })
                            .collect(),
                        shuffle: false,
                    }),
                    grading: None,
                },
            }),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach quiz grading to a question item. No effect on text items.
    pub fn with_grading(mut self, point_value: u32, correct: impl Into<String>) -> Self {
        if let Some(q) = self.question_item.as_mut() {
            q.question.grading = Some(Grading {
                point_value,
                correct_answers: CorrectAnswers {
                    answers: vec![CorrectAnswer {
                        value: correct.into(),
                    }],
                },
            });
        }
        self
    }

    /// True when the item carries quiz grading.
    pub fn is_graded(&self) -> bool {
        self.question_item
            .as_ref()
            .is_some_and(|q| q.question.grading.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub question: Question,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_question: Option<ChoiceQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading: Option<Grading>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(rename = "type")]
    pub kind: ChoiceType,
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub shuffle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    Radio,
    Checkbox,
    DropDown,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grading {
    pub point_value: u32,
    pub correct_answers: CorrectAnswers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswers {
    pub answers: Vec<CorrectAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswer {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {}

// -- batchUpdate requests -------------------------------------------------------

/// Position of an item in the form, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub index: usize,
}

impl Location {
    pub fn at(index: usize) -> Self {
        Self { index }
    }
}

/// One `batchUpdate` request, serialised in the API's externally tagged
/// shape (`{"createItem": {...}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    CreateItem { item: Item, location: Location },
    DeleteItem { location: Location },
    UpdateFormInfo { info: FormInfo, update_mask: String },
    UpdateSettings { settings: FormSettings, update_mask: String },
}

impl Request {
    /// Insert `item` at `index`.
    pub fn create_item(item: Item, index: usize) -> Self {
        Self::CreateItem {
            item,
            location: Location::at(index),
        }
    }

    /// Delete the item at `index`.
    pub fn delete_item(index: usize) -> Self {
        Self::DeleteItem {
            location: Location::at(index),
        }
    }

    /// Set title and description together.
    pub fn update_title_and_description(title: impl Into<String>, description: String) -> Self {
        Self::UpdateFormInfo {
            info: FormInfo::new(title, Some(description)),
            update_mask: "title,description".into(),
        }
    }

    /// Turn quiz mode on.
    pub fn enable_quiz() -> Self {
        Self::UpdateSettings {
            settings: FormSettings {
                quiz_settings: Some(QuizSettings { is_quiz: true }),
                collect_email: None,
            },
            update_mask: "quizSettings.isQuiz".into(),
        }
    }

    /// Switch respondent email collection.
    pub fn collect_email(enabled: bool) -> Self {
        Self::UpdateSettings {
            settings: FormSettings {
                quiz_settings: None,
                collect_email: Some(enabled),
            },
            update_mask: "collectEmail".into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [Request],
}

/// Response of `batchUpdate`. Replies are kept raw.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
    #[serde(default)]
    pub form: Option<Form>,
}

#[derive(Debug, Serialize)]
struct CreateFormRequest<'a> {
    info: CreateFormInfo<'a>,
}

#[derive(Debug, Serialize)]
struct CreateFormInfo<'a> {
    title: &'a str,
}

/// Edit link for a form.
pub fn edit_url(form_id: &str) -> String {
    format!("https://docs.google.com/forms/d/{form_id}/edit")
}

/// Public (respondent) link for a form.
pub fn public_url(form_id: &str) -> String {
    format!("https://docs.google.com/forms/d/{form_id}/viewform")
}

// -- Client ---------------------------------------------------------------------

/// Client for the Forms API.
#[derive(Debug, Clone)]
pub struct FormsClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl FormsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Create a form with only a title.
    ///
    /// Calls `POST {base_url}/v1/forms`.
    pub async fn create(&self, title: &str) -> Result<Form, GoogleApiError> {
        let endpoint = "POST /v1/forms";
        let url = format!("{}{}", self.base_url, API_PREFIX);
        let body = CreateFormRequest {
            info: CreateFormInfo { title },
        };

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        read_json(resp, endpoint).await
    }

    /// Fetch a form with its items.
    ///
    /// Calls `GET {base_url}/v1/forms/{form_id}`.
    pub async fn get(&self, form_id: &str) -> Result<Form, GoogleApiError> {
        let endpoint = format!("GET /v1/forms/{form_id}");
        let url = format!("{}{}/{form_id}", self.base_url, API_PREFIX);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        read_json(resp, &endpoint).await
    }

    /// Apply a list of requests atomically.
    ///
    /// Calls `POST {base_url}/v1/forms/{form_id}:batchUpdate`.
    pub async fn batch_update(
        &self,
        form_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, GoogleApiError> {
        let endpoint = format!("POST /v1/forms/{form_id}:batchUpdate");
        let url = format!("{}{}/{form_id}:batchUpdate", self.base_url, API_PREFIX);

        let resp = self
            .http
            .post(&url)
            .json(&BatchUpdateRequest { requests })
            .send()
            .await
            .map_err(|e| GoogleApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        read_json(resp, &endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_item_serialises_in_api_shape() {
        let item = Item::radio("1: Which?", &["a".into(), "b".into()], true)
            .with_description("Seção: s")
            .with_grading(1, "b");
        let value = serde_json::to_value(Request::create_item(item, 3)).unwrap();
        assert_eq!(
            value,
            json!({
                "createItem": {
                    "item": {
                        "title": "1: Which?",
                        "description": "Seção: s",
                        "questionItem": {
                            "question": {
                                "required": true,
                                "choiceQuestion": {
                                    "type": "RADIO",
                                    "options": [{"value": "a"}, {"value": "b"}],
                                    "shuffle": false
                                },
                                "grading": {
                                    "pointValue": 1,
                                    "correctAnswers": {"answers": [{"value": "b"}]}
                                }
                            }
                        }
                    },
                    "location": {"index": 3}
                }
            })
        );
    }

    #[test]
    fn text_item_serialises_empty_text_block() {
        let value = serde_json::to_value(Request::create_item(Item::text("Read."), 0)).unwrap();
        assert_eq!(
            value,
            json!({"createItem": {"item": {"title": "Read.", "textItem": {}}, "location": {"index": 0}}})
        );
    }

    #[test]
    fn info_and_settings_requests_carry_update_masks() {
        let info = serde_json::to_value(Request::update_title_and_description("T", "D".into())).unwrap();
        assert_eq!(
            info,
            json!({"updateFormInfo": {"info": {"title": "T", "description": "D"}, "updateMask": "title,description"}})
        );

        let quiz = serde_json::to_value(Request::enable_quiz()).unwrap();
        assert_eq!(
            quiz,
            json!({"updateSettings": {"settings": {"quizSettings": {"isQuiz": true}}, "updateMask": "quizSettings.isQuiz"}})
        );

        let delete = serde_json::to_value(Request::delete_item(0)).unwrap();
        assert_eq!(delete, json!({"deleteItem": {"location": {"index": 0}}}));
    }

    #[test]
    fn form_tolerates_missing_items_and_unknown_fields() {
        let form: Form = serde_json::from_value(json!({
            "formId": "abc",
            "info": {"title": "T", "documentTitle": "doc"},
            "linkedSheetId": "ignored"
        }))
        .unwrap();
        assert!(form.items.is_empty());
        assert_eq!(form.info.document_title.as_deref(), Some("doc"));
    }

    #[test]
    fn unknown_choice_type_maps_to_catch_all() {
        let q: ChoiceQuestion =
            serde_json::from_value(json!({"type": "SCALE", "options": []})).unwrap();
        assert_eq!(q.kind, ChoiceType::Unknown);
    }

    #[test]
    fn grading_is_ignored_on_text_items() {
        assert!(!Item::text("x").with_grading(1, "a").is_graded());
        assert!(Item::radio("q", &["a".into()], true).with_grading(1, "a").is_graded());
    }

    #[test]
    fn form_links() {
        assert_eq!(edit_url("f1"), "https://docs.google.com/forms/d/f1/edit");
        assert_eq!(public_url("f1"), "https://docs.google.com/forms/d/f1/viewform");
    }
}
