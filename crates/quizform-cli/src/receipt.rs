//! Plain-text record of the last publish, written next to the sources so
//! the links are at hand without opening Drive.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::publish::PublishOutcome;

/// Timestamp format used in receipts.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything a receipt shows.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    /// Quiz name (source file stem).
    pub name: &'a str,
    /// Form title.
    pub title: &'a str,
    pub source: &'a Path,
    pub outcome: &'a PublishOutcome,
}

impl Receipt<'_> {
    /// Render the receipt as of `at`.
    pub fn render<Tz: TimeZone>(&self, at: DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let o = self.outcome;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Last published form:");
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Date: {}", at.format(TIMESTAMP_FORMAT));
        let _ = writeln!(out, "Title: {}", self.title);
        let _ = writeln!(out, "ID: {}", o.form_id);
        let _ = writeln!(out, "Public link: {}", o.public_url);
        let _ = writeln!(out, "Edit link: {}", o.edit_url);
        let _ = writeln!(out, "Total questions: {}", o.total_questions);
        let _ = writeln!(out, "Source file: {}", self.source.display());
        let _ = writeln!(out, "Sections:");
        for (section, count) in &o.sections {
            let _ = writeln!(out, "  - {section}: {count} questions");
        }
        out
    }

    /// Write the receipt to `path`, replacing any previous one.
    pub fn write<Tz: TimeZone>(&self, path: &Path, at: DateTime<Tz>) -> std::io::Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        std::fs::write(path, self.render(at))
    }
}
