//! # Validate Subcommand
//!
//! Schema check of one quiz source. Every violation is reported in a
//! single pass so a broken file can be fixed in one edit.
//!
//! The same check gates `publish`: nothing is sent to Google unless the
//! source passes.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use quizform_schema::{load_source, validate, DocumentError};

use crate::settings::PublishSettings;
use crate::{quiz_path, EXIT_FAILURE, EXIT_MALFORMED, EXIT_NOT_FOUND, EXIT_OK, EXIT_SCHEMA};

/// Printed when a source passes.
pub const PASSED_BANNER: &str = "VALIDATION PASSED: quiz looks good (basic checks).";

/// Printed before the list of violations.
pub const FAILED_BANNER: &str = "VALIDATION FAILED. Issues found:";

/// Arguments for the `quizform validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Quiz name, with or without the `.json` suffix.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Load `path` and run the schema check, printing any problem.
///
/// Returns the decoded document when it passes, or the exit code to stop
/// with.
pub fn load_checked(path: &Path) -> Result<Value, u8> {
    let value = match load_source(path) {
        Ok(value) => value,
        Err(err @ DocumentError::NotFound { .. }) => {
            println!("{err}");
            if let Some(dir) = path.parent() {
                crate::list::print_available(dir);
            }
            return Err(EXIT_NOT_FOUND);
        }
        Err(err @ DocumentError::Malformed { .. }) => {
            println!("{err}");
            return Err(EXIT_MALFORMED);
        }
        Err(err) => {
            println!("{err}");
            return Err(EXIT_FAILURE);
        }
    };

    let report = validate(&value, &path.display().to_string());
    if !report.is_ok() {
        tracing::info!(source = %path.display(), violations = report.len(), "schema check failed");
        println!("{FAILED_BANNER}");
        println!("{report}");
        return Err(EXIT_SCHEMA);
    }

    Ok(value)
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when valid, 2 on violations, 3 when the source is
/// missing, 4 when it is not JSON.
pub fn run_validate(args: &ValidateArgs, settings: &PublishSettings) -> Result<u8> {
    let path = quiz_path(&args.name, &settings.forms_dir);
    tracing::debug!(path = %path.display(), "validating quiz source");

    match load_checked(&path) {
        Ok(_) => {
            println!("{PASSED_BANNER}");
            Ok(EXIT_OK)
        }
        Err(code) => Ok(code),
    }
}
