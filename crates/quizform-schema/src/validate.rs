//! # Quiz Document Validation
//!
//! Checks a decoded quiz document against the fixed quiz schema and returns
//! every violation it finds in one pass.
//!
//! ## Design
//!
//! [`validate`] works on an untyped [`serde_json::Value`] rather than on the
//! typed [`QuizDocument`](crate::QuizDocument): a document with the wrong
//! shape has to be described, not rejected by a deserializer at its first
//! problem. No check stops the run. A value of the wrong type degrades only
//! the checks that depend on it, and the remaining checks still execute.
//!
//! Violations come out in discovery order: top-level keys, then metadata,
//! then questions in document order with their sub-checks in a fixed order
//! (missing fields, `id`, `options`, `correct_answer`, `difficulty`).

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};

/// Keys every quiz document must carry at its root.
pub const REQUIRED_TOP_LEVEL_KEYS: [&str; 3] = ["metadata", "content", "questions"];

/// Metadata fields every quiz document must carry.
pub const REQUIRED_METADATA_FIELDS: [&str; 5] = ["title", "description", "subject", "grade", "topic"];

/// Fields every question entry must carry.
pub const REQUIRED_QUESTION_FIELDS: [&str; 5] = ["id", "section", "question", "options", "correct_answer"];

/// Accepted `difficulty` labels.
pub const ALLOWED_DIFFICULTIES: [&str; 3] = ["fácil", "médio", "difícil"];

/// Minimum number of answer options per question.
pub const MIN_OPTIONS: usize = 2;

/// Maximum number of answer options per question.
pub const MAX_OPTIONS: usize = 6;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single schema rule broken by a quiz document.
///
/// `question` fields are 1-based positions in the `questions` array. The
/// `Display` output is the human-readable line shown to the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The decoded root value is not a JSON object.
    RootNotObject,
    /// A required top-level key is absent.
    MissingTopLevelKey(&'static str),
    /// A metadata field is absent or is a blank string.
    MissingMetadataField(&'static str),
    /// `questions` is absent, not an array, or empty.
    QuestionsNotNonEmptyArray,
    /// A `questions` entry is not a JSON object.
    QuestionNotObject { question: usize },
    /// A required question field is absent.
    MissingQuestionField { question: usize, field: &'static str },
    /// `id` is present but not an integer.
    IdNotInteger { question: usize },
    /// `id` repeats an earlier question's id.
    DuplicateId { id: i128 },
    /// `options` is present but not an array.
    OptionsNotArray { question: usize },
    /// `options` has fewer than two or more than six entries.
    OptionsLength { question: usize, len: usize },
    /// Two options are equal once surrounding whitespace is trimmed.
    DuplicateOptions { question: usize },
    /// `correct_answer` is present but not an integer.
    CorrectAnswerNotInteger { question: usize },
    /// `correct_answer` does not index into `options`.
    CorrectAnswerOutOfRange { question: usize, index: i128, len: usize },
    /// `difficulty` is set to a label outside [`ALLOWED_DIFFICULTIES`].
    InvalidDifficulty { question: usize, value: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotObject => write!(f, "document root must be a JSON object"),
            Self::MissingTopLevelKey(key) => write!(f, "Missing top-level key: {key}"),
            Self::MissingMetadataField(field) => {
                write!(f, "Missing or empty metadata field: {field}")
            }
            Self::QuestionsNotNonEmptyArray => write!(f, "'questions' must be a non-empty array"),
            Self::QuestionNotObject { question } => {
                write!(f, "question[{question}]: entry must be an object")
            }
            Self::MissingQuestionField { question, field } => {
                write!(f, "question[{question}]: missing field '{field}'")
            }
            Self::IdNotInteger { question } => {
                write!(f, "question[{question}]: 'id' must be an integer")
            }
            Self::DuplicateId { id } => write!(f, "Duplicate id: {id}"),
            Self::OptionsNotArray { question } => {
                write!(f, "question[{question}]: 'options' must be an array")
            }
            Self::OptionsLength { question, len } => write!(
                f,
                "question[{question}]: 'options' length must be between {MIN_OPTIONS} and {MAX_OPTIONS} (got {len})"
            ),
            Self::DuplicateOptions { question } => {
                write!(f, "question[{question}]: duplicate option texts found")
            }
            Self::CorrectAnswerNotInteger { question } => {
                write!(f, "question[{question}]: 'correct_answer' must be integer index")
            }
            Self::CorrectAnswerOutOfRange { question, index, len } => write!(
                f,
                "question[{question}]: 'correct_answer' index {index} out of range for options length {len}"
            ),
            Self::InvalidDifficulty { question, value } => {
                write!(f, "question[{question}]: invalid difficulty '{value}'")
            }
        }
    }
}

/// Outcome of validating one quiz document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    source: String,
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// The identifier (usually a file path) the document was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the document satisfies every rule.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations found.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True when no violations were found.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in discovery order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violation messages in discovery order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, " - {v}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a decoded quiz document.
///
/// `source` names where the document came from and is carried into the
/// report for messages only. The function reads nothing and writes nothing;
/// calling it twice on the same value yields equal reports.
pub fn validate(document: &Value, source: &str) -> ValidationReport {
    let mut violations = Vec::new();

    match document.as_object() {
        Some(root) => check_root(root, &mut violations),
        None => violations.push(Violation::RootNotObject),
    }

    if !violations.is_empty() {
        tracing::debug!(source, count = violations.len(), "quiz document has violations");
    }

    ValidationReport {
        source: source.to_string(),
        violations,
    }
}

fn check_root(root: &Map<String, Value>, out: &mut Vec<Violation>) {
    for key in REQUIRED_TOP_LEVEL_KEYS {
        if !root.contains_key(key) {
            out.push(Violation::MissingTopLevelKey(key));
        }
    }

    let empty = Map::new();
    let metadata = root.get("metadata").and_then(Value::as_object).unwrap_or(&empty);
    check_metadata(metadata, out);

    match root.get("questions").and_then(Value::as_array) {
        Some(questions) if !questions.is_empty() => {
            let mut seen_ids = HashSet::new();
            for (i, entry) in questions.iter().enumerate() {
                check_question(i + 1, entry, &mut seen_ids, out);
            }
        }
        _ => out.push(Violation::QuestionsNotNonEmptyArray),
    }
}

fn check_metadata(metadata: &Map<String, Value>, out: &mut Vec<Violation>) {
    for field in REQUIRED_METADATA_FIELDS {
        let blank = match metadata.get(field) {
            None => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if blank {
            out.push(Violation::MissingMetadataField(field));
        }
    }
}

fn check_question(
    question: usize,
    entry: &Value,
    seen_ids: &mut HashSet<i128>,
    out: &mut Vec<Violation>,
) {
    let Some(fields) = entry.as_object() else {
        out.push(Violation::QuestionNotObject { question });
        return;
    };

    for field in REQUIRED_QUESTION_FIELDS {
        if !fields.contains_key(field) {
            out.push(Violation::MissingQuestionField { question, field });
        }
    }

    if let Some(id) = fields.get("id") {
        match as_integer(id) {
            // Every repeat is reported, not only the first.
            Some(id) if !seen_ids.insert(id) => out.push(Violation::DuplicateId { id }),
            Some(_) => {}
            None => out.push(Violation::IdNotInteger { question }),
        }
    }

    let options = fields.get("options");
    if let Some(options) = options {
        match options.as_array() {
            Some(items) => check_options(question, items, out),
            None => out.push(Violation::OptionsNotArray { question }),
        }
    }

    if let Some(answer) = fields.get("correct_answer") {
        match as_integer(answer) {
            Some(index) => {
                if let Some(items) = options.and_then(Value::as_array) {
                    let len = items.len();
                    if index < 0 || index >= len as i128 {
                        out.push(Violation::CorrectAnswerOutOfRange { question, index, len });
                    }
                }
            }
            None => out.push(Violation::CorrectAnswerNotInteger { question }),
        }
    }

    match fields.get("difficulty") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if ALLOWED_DIFFICULTIES.contains(&s.as_str()) => {}
        Some(other) => out.push(Violation::InvalidDifficulty {
            question,
            value: option_text(other),
        }),
    }
}

fn check_options(question: usize, items: &[Value], out: &mut Vec<Violation>) {
    let len = items.len();
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&len) {
        out.push(Violation::OptionsLength { question, len });
    }

    let mut seen = HashSet::with_capacity(len);
    let unique = items
        .iter()
        .map(|item| option_text(item).trim().to_string())
        .all(|text| seen.insert(text));
    if !unique {
        out.push(Violation::DuplicateOptions { question });
    }
}

/// Integer view of a JSON number. Floats (even `1.0`) and booleans are not
/// integers.
fn as_integer(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

/// Text of a scalar as an author would read it: strings unquoted, anything
/// else in its JSON form.
fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
