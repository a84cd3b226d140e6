//! Integration tests: validate quiz documents end to end through the public
//! API (load → validate → typed conversion), plus property tests showing the
//! validator is total and deterministic over arbitrary JSON.

use proptest::prelude::*;
use quizform_schema::{load_source, validate, DocumentError, QuizDocument, Violation};
use serde_json::{json, Value};

fn valid_quiz() -> Value {
    json!({
        "metadata": {
            "title": "Pronouns",
            "description": ["Practice personal pronouns.", "Ten minutes."],
            "subject": "Portuguese",
            "grade": "6th",
            "topic": "Pronouns"
        },
        "content": {"instructions": "Choose the best answer."},
        "questions": [
            {"id": 1, "section": "Personal", "question": "Which is a pronoun?", "options": ["ele", "casa", "azul"], "correct_answer": 0, "difficulty": "fácil"},
            {"id": 2, "section": "Personal", "question": "Plural of eu?", "options": ["nós", "vós"], "correct_answer": 0, "difficulty": "médio"},
            {"id": 3, "section": "Possessive", "question": "Pick the possessive.", "options": ["meu", "mim", "me", "comigo"], "correct_answer": 0}
        ],
        "settings": {"collect_email": true, "allow_multiple_responses": false},
        "evaluation": {
            "include_evaluation": true,
            "evaluation_questions": [{"question": "Was it fun?", "options": ["Yes", "No"]}]
        }
    })
}

#[test]
fn valid_file_loads_validates_and_converts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pronouns.json");
    std::fs::write(&path, serde_json::to_string_pretty(&valid_quiz()).unwrap()).unwrap();

    let value = load_source(&path).unwrap();
    let report = validate(&value, &path.display().to_string());
    assert!(report.is_ok(), "unexpected violations:\n{report}");

    let doc = QuizDocument::from_value(value, "pronouns").unwrap();
    assert_eq!(doc.questions.len(), 3);
    assert_eq!(doc.evaluation_questions().len(), 1);
    assert!(doc.settings.as_ref().unwrap().needs_single_response_limit());
}

#[test]
fn broken_file_reports_every_problem_in_one_pass() {
    let mut quiz = valid_quiz();
    quiz.as_object_mut().unwrap().remove("content");
    quiz["metadata"]["subject"] = json!("");
    quiz["questions"][1]["id"] = json!(1);
    quiz["questions"][1]["options"] = json!(["nós", " nós "]);
    quiz["questions"][2]["correct_answer"] = json!(4);
    quiz["questions"][2]["difficulty"] = json!("impossível");

    let report = validate(&quiz, "broken.json");
    assert_eq!(
        report.violations(),
        &[
            Violation::MissingTopLevelKey("content"),
            Violation::MissingMetadataField("subject"),
            Violation::DuplicateId { id: 1 },
            Violation::DuplicateOptions { question: 2 },
            Violation::CorrectAnswerOutOfRange { question: 3, index: 4, len: 4 },
            Violation::InvalidDifficulty { question: 3, value: "impossível".into() },
        ]
    );
}

#[test]
fn malformed_json_never_reaches_the_validator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.json");
    std::fs::write(&path, "{\"metadata\": {\"title\": ").unwrap();
    let err = load_source(&path).unwrap_err();
    assert!(matches!(err, DocumentError::Malformed { .. }), "got {err:?}");
    assert!(err.to_string().contains("invalid JSON"));
}

#[test]
fn missing_file_is_not_found() {
    let err = load_source(std::path::Path::new("/nonexistent/quizform/none.json")).unwrap_err();
    assert!(matches!(err, DocumentError::NotFound { .. }));
    assert!(err.to_string().starts_with("quiz file not found"));
}

fn arbitrary_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("metadata".to_string()),
                    Just("content".to_string()),
                    Just("questions".to_string()),
                    Just("id".to_string()),
                    Just("options".to_string()),
                    Just("correct_answer".to_string()),
                    Just("difficulty".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..6,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// The validator accepts any JSON value without panicking.
    #[test]
    fn validate_is_total(value in arbitrary_json()) {
        let _ = validate(&value, "prop");
    }

    /// Same input, same report.
    #[test]
    fn validate_is_deterministic(value in arbitrary_json()) {
        prop_assert_eq!(validate(&value, "prop"), validate(&value, "prop"));
    }

    /// Any option list of 2..=6 distinct labels passes the option checks.
    #[test]
    fn distinct_options_within_bounds_pass(
        labels in prop::collection::btree_set("[a-z]{1,8}", 2..=6),
        pick in 0usize..6,
    ) {
        let labels: Vec<String> = labels.into_iter().collect();
        let answer = pick % labels.len();
        let mut quiz = valid_quiz();
        quiz["questions"][0]["options"] = json!(labels);
        quiz["questions"][0]["correct_answer"] = json!(answer);
        let report = validate(&quiz, "prop");
        prop_assert!(report.is_ok(), "{}", report);
    }
}
