//! # quizform CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quizform_cli::list::run_list;
use quizform_cli::publish::{run_publish, PublishArgs};
use quizform_cli::settings::PublishSettings;
use quizform_cli::validate::{run_validate, ValidateArgs};
use quizform_cli::EXIT_FAILURE;

/// Validate JSON quiz sources and publish them as Google Forms quizzes.
///
/// Publishing needs an OAuth access token with the Forms and Drive scopes in
/// `QUIZFORM_ACCESS_TOKEN`.
#[derive(Parser, Debug)]
#[command(name = "quizform", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the quiz sources.
    #[arg(long, global = true)]
    forms_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a quiz source against the schema and report every problem.
    Validate(ValidateArgs),

    /// Validate a quiz source, then create or update its Google Form.
    Publish(PublishArgs),

    /// List the quizzes in the forms directory.
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("quizform CLI starting");

    let mut settings = match PublishSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if let Some(dir) = cli.forms_dir {
        settings.forms_dir = dir;
    }

    tracing::debug!(forms_dir = %settings.forms_dir.display(), "resolved forms directory");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &settings),
        Commands::Publish(args) => run_publish(&args, &settings).await,
        Commands::List => run_list(&settings),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
