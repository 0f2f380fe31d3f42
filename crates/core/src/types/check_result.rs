use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Severity;
use crate::error::Error;

/// Position of a finding in the checked file (1-based line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    pub fn line(line: u32) -> Self {
        Self { line, column: None }
    }

    pub fn with_column(line: u32, column: u32) -> Self {
        Self {
            line,
            column: Some(column),
        }
    }

    /// Parse a line number the way tool output prints it. Anything that is not
    /// a plain integer yields `None` so the caller can keep the row unlocated.
    pub fn parse_line(text: &str) -> Option<Self> {
        text.trim().parse::<u32>().ok().map(Self::line)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}:{}", self.line, column),
            None => write!(f, "{}", self.line),
        }
    }
}

/// One finding surfaced to the UI.
///
/// Field order matters: the derived `Ord` sorts by severity, then location
/// (unlocated rows first), then message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CheckRow {
    pub severity: Severity,
    pub location: Option<Location>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CheckRow {
    pub fn new(severity: Severity, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity,
            location,
            message: message.into(),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, None)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Structured outcome of one check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Findings, de-duplicated and kept in `CheckRow` order
    pub rows: Vec<CheckRow>,
    /// Informational lines (command line used, extra search path, ...)
    pub notices: Vec<String>,
    /// Fatal conditions such as a missing interpreter
    pub errors: BTreeSet<String>,
    /// Free-form report text some tools print after their findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result carrying a single `Error` row describing `error`
    pub fn from_error(error: &Error) -> Self {
        let mut result = Self::new();
        result.push_fatal(error.to_string());
        result
    }

    /// Record a fatal condition both as an error and as a visible row
    pub fn push_fatal(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.errors.insert(message.clone()) {
            self.extend_rows([CheckRow::error(message)]);
        }
    }

    pub fn push_notice(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
    }

    /// Merge rows in, collapsing duplicates and restoring the sort order
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = CheckRow>) {
        let merged: BTreeSet<CheckRow> = self.rows.drain(..).chain(rows).collect();
        self.rows = merged.into_iter().collect();
    }

    pub fn has_errors(&self) -> bool {
        self.rows.iter().any(|row| row.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.rows.iter().filter(|row| row.severity == severity).count()
    }

    /// First located `Error` row, used to place an error marker
    pub fn first_error_location(&self) -> Option<(Location, &str)> {
        self.rows
            .iter()
            .filter(|row| row.severity == Severity::Error)
            .find_map(|row| row.location.map(|loc| (loc, row.message.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.errors.is_empty()
    }
}
