//! # List Subcommand
//!
//! Names of the quiz sources in the forms directory.

use std::path::Path;

use anyhow::Result;

use crate::settings::PublishSettings;
use crate::{EXIT_OK, QUIZ_EXTENSION};

/// Quiz names (file stems of `*.json`) in `forms_dir`, sorted.
///
/// A missing or unreadable directory yields an empty list.
pub fn available_quizzes(forms_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(forms_dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == QUIZ_EXTENSION))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

/// Print the available quizzes under a heading.
pub fn print_available(forms_dir: &Path) {
    let names = available_quizzes(forms_dir);
    if names.is_empty() {
        println!("No quizzes found in {}", forms_dir.display());
        return;
    }
    println!("Available quizzes in {}:", forms_dir.display());
    for name in names {
        println!("  - {name}");
    }
}

/// Execute the list subcommand.
pub fn run_list(settings: &PublishSettings) -> Result<u8> {
    print_available(&settings.forms_dir);
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_json_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pronouns.json"), "{}").unwrap();
        std::fs::write(dir.path().join("algebra.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("drafts.json")).unwrap();

        assert_eq!(available_quizzes(dir.path()), vec!["algebra", "pronouns"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(available_quizzes(Path::new("/nonexistent/quizform-forms")).is_empty());
    }

    #[test]
    fn run_list_succeeds_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PublishSettings {
            forms_dir: dir.path().to_path_buf(),
            ..PublishSettings::default()
        };
        assert_eq!(run_list(&settings).unwrap(), EXIT_OK);
    }
}
