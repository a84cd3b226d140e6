//! # quizform-schema -- Quiz Document Model & Validation
//!
//! Defines the quiz document format and the validator every quiz must pass
//! before it is published.
//!
//! ## Validation (`validate`)
//!
//! [`validate()`] takes a decoded JSON value and returns a
//! [`ValidationReport`] listing every broken rule at once, so an author can
//! fix a quiz file in one pass. It never panics on unexpected shapes: a
//! wrong type becomes a [`Violation`], not an error.
//!
//! ## Document model (`document`)
//!
//! [`QuizDocument`] is the typed form the publisher consumes. It is built
//! with [`QuizDocument::from_value`] only after validation succeeds.
//! [`load_source`] reads and decodes a source file, keeping "file not found"
//! and "invalid JSON" apart from schema violations.
//!
//! ## Crate Policy
//!
//! - No I/O in the validator; reading files is the caller's job.
//! - Violation messages are part of the CLI contract. Change them together
//!   with the CLI tests.

pub mod document;
pub mod validate;

pub use document::{
    default_evaluation_questions, load_source, Content, Difficulty, DocumentError, Evaluation,
    EvaluationQuestion, Metadata, Question, QuizDocument, Settings, Text,
};
pub use validate::{validate, ValidationReport, Violation};
