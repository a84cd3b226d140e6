//! # quizform-cli -- CLI Tool for Quiz Sources
//!
//! Provides the `quizform` command-line interface over a directory of JSON
//! quiz sources.
//!
//! ## Subcommands
//!
//! - `quizform validate <name>`: Schema check, all problems reported at once.
//! - `quizform publish <name>`: Validate, then create or update the Google
//!   Form and file it in the study folder.
//! - `quizform list`: Quizzes available in the forms directory.
//!
//! ```bash
//! quizform validate pronouns
//! quizform --forms-dir ./quizzes publish pronouns.json --receipt out.txt
//! QUIZFORM_ACCESS_TOKEN=... quizform -v publish pronouns
//! ```
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | remote or operational failure |
//! | 2 | schema violations |
//! | 3 | source not found |
//! | 4 | malformed JSON or unsupported structure |

pub mod list;
pub mod publish;
pub mod receipt;
pub mod settings;
pub mod validate;

use std::path::{Path, PathBuf};

/// Successful run.
pub const EXIT_OK: u8 = 0;
/// A remote call or local operation failed.
pub const EXIT_FAILURE: u8 = 1;
/// The source violates the quiz schema.
pub const EXIT_SCHEMA: u8 = 2;
/// The named source does not exist.
pub const EXIT_NOT_FOUND: u8 = 3;
/// The source is not valid JSON, or has blocks of the wrong shape.
pub const EXIT_MALFORMED: u8 = 4;

/// File extension of quiz sources.
pub const QUIZ_EXTENSION: &str = "json";

/// Resolve a quiz name to its source path inside `forms_dir`.
///
/// The name may carry the `.json` suffix or not: `pronouns` and
/// `pronouns.json` both resolve to `<forms_dir>/pronouns.json`.
pub fn quiz_path(name: &str, forms_dir: &Path) -> PathBuf {
    let stem = name
        .strip_suffix(".json")
        .filter(|s| !s.is_empty())
        .unwrap_or(name);
    forms_dir.join(format!("{stem}.{QUIZ_EXTENSION}"))
}

/// Form name for a source: its file stem.
pub fn form_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
