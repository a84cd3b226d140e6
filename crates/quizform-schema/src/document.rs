//! # Quiz Document Model
//!
//! Typed view of a quiz definition, built from the JSON value only after
//! [`validate`](crate::validate()) has accepted it. Also hosts the source
//! loader, which separates "no such file" from "not JSON" before any
//! document exists.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while turning a source file into a quiz document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The source path does not name an existing file.
    #[error("quiz file not found: {}", .path.display())]
    NotFound {
        /// The resolved source path.
        path: PathBuf,
    },

    /// The source exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// The resolved source path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source is not valid JSON.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Malformed {
        /// The resolved source path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The document passed validation but one of the blocks the validator
    /// does not inspect (`settings`, `evaluation`, `content`) has the wrong
    /// shape.
    #[error("unsupported document structure in {source_name}: {source}")]
    Shape {
        /// Identifier of the document.
        source_name: String,
        /// Underlying conversion error.
        source: serde_json::Error,
    },
}

/// Read and decode a quiz source file into an untyped JSON value.
pub fn load_source(path: &Path) -> Result<Value, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| DocumentError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Prose
// ---------------------------------------------------------------------------

/// Free text that authors may write as one string, as a list of lines, or
/// (for metadata like `grade`) as a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    /// A single string.
    Line(String),
    /// An ordered list of strings.
    Lines(Vec<String>),
    /// Any other JSON scalar, rendered in its JSON form.
    Scalar(Value),
}

impl Text {
    /// Render the text, joining list entries with `separator`.
    pub fn joined(&self, separator: &str) -> String {
        match self {
            Self::Line(s) => s.clone(),
            Self::Lines(lines) => lines.join(separator),
            Self::Scalar(Value::String(s)) => s.clone(),
            Self::Scalar(v) => v.to_string(),
        }
    }

    /// True when the rendered text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.joined("").trim().is_empty()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined("\n"))
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A validated quiz definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    pub metadata: Metadata,
    pub content: Content,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Text,
    pub description: Text,
    pub subject: Text,
    pub grade: Text,
    pub topic: Text,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub instructions: Option<Text>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: serde_json::Number,
    pub section: Text,
    pub question: Text,
    pub options: Vec<Text>,
    pub correct_answer: usize,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl Question {
    /// Option labels as they will be shown to respondents.
    pub fn option_labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.joined(" ")).collect()
    }

    /// Label of the correct option, if `correct_answer` is in range.
    pub fn correct_label(&self) -> Option<String> {
        self.options.get(self.correct_answer).map(|o| o.joined(" "))
    }
}

/// Difficulty levels accepted by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "fácil")]
    Easy,
    #[serde(rename = "médio")]
    Medium,
    #[serde(rename = "difícil")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "fácil"),
            Self::Medium => write!(f, "médio"),
            Self::Hard => write!(f, "difícil"),
        }
    }
}

/// Publish-time behaviour switches. Absent keys keep the form's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_login: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple_responses: Option<bool>,
}

impl Settings {
    /// True when the block sets nothing, as in `"settings": {}`.
    pub fn is_empty(&self) -> bool {
        self.require_login.is_none()
            && self.collect_email.is_none()
            && self.allow_multiple_responses.is_none()
    }

    pub fn require_login(&self) -> bool {
        self.require_login.unwrap_or(false)
    }

    /// Whether respondent emails are collected. Required login implies it.
    pub fn effective_collect_email(&self) -> bool {
        self.require_login() || self.collect_email.unwrap_or(false)
    }

    /// Whether the form owner must switch on "limit to one response" by hand.
    pub fn needs_single_response_limit(&self) -> bool {
        self.require_login() || !self.allow_multiple_responses.unwrap_or(true)
    }
}

/// Optional self-assessment block appended after the graded questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub include_evaluation: bool,
    #[serde(default)]
    pub evaluation_questions: Option<Vec<EvaluationQuestion>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationQuestion {
    pub question: String,
    pub options: Vec<String>,
}

impl EvaluationQuestion {
    fn new(question: &str, options: [&str; 5]) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl Evaluation {
    /// Evaluation questions to publish: the document's own list, or the
    /// built-in set when the document enables evaluation without one.
    pub fn questions(&self) -> Vec<EvaluationQuestion> {
        match &self.evaluation_questions {
            Some(list) => list.clone(),
            None => default_evaluation_questions(),
        }
    }
}

/// The built-in self-assessment questions.
pub fn default_evaluation_questions() -> Vec<EvaluationQuestion> {
    vec![
        EvaluationQuestion::new(
            "Como você avalia a dificuldade deste quiz?",
            ["Muito fácil", "Fácil", "Médio", "Difícil", "Muito difícil"],
        ),
        EvaluationQuestion::new(
            "O que você achou das questões?",
            ["Muito interessantes", "Interessantes", "Normais", "Chatas", "Muito chatas"],
        ),
        EvaluationQuestion::new(
            "Você recomendaria este quiz para seus colegas?",
            ["Sim, com certeza", "Sim", "Talvez", "Não", "Definitivamente não"],
        ),
    ]
}

impl QuizDocument {
    /// Convert a validated JSON value into the typed document.
    ///
    /// Call [`validate`](crate::validate()) first; this conversion reports
    /// only the first structural problem it meets.
    pub fn from_value(value: Value, source_name: &str) -> Result<Self, DocumentError> {
        serde_json::from_value(value).map_err(|e| DocumentError::Shape {
            source_name: source_name.to_string(),
            source: e,
        })
    }

    /// Question counts per section, in order of first appearance.
    pub fn section_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for q in &self.questions {
            let section = q.section.joined(" ");
            match counts.iter_mut().find(|(name, _)| *name == section) {
                Some((_, n)) => *n += 1,
                None => counts.push((section, 1)),
            }
        }
        counts
    }

    /// Instruction text for the form header, list entries joined by a space.
    pub fn instructions_text(&self) -> Option<String> {
        self.content
            .instructions
            .as_ref()
            .filter(|t| !t.is_blank())
            .map(|t| t.joined(" "))
    }

    /// Evaluation questions to publish, or none when evaluation is off.
    pub fn evaluation_questions(&self) -> Vec<EvaluationQuestion> {
        match &self.evaluation {
            Some(eval) if eval.include_evaluation => eval.questions(),
            _ => Vec::new(),
        }
    }
}
