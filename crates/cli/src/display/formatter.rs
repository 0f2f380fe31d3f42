use std::fmt::Write;
use std::path::Path;

use checkrunner_core::{CheckResult, CheckRow, FindResults, Severity};

fn format_row(row: &CheckRow) -> String {
    let location = row
        .location
        .map(|loc| loc.to_string())
        .unwrap_or_else(|| "-".to_string());
    match &row.code {
        Some(code) => format!("{:<7} {:>7}  {} [{}]", row.severity.as_str(), location, row.message, code),
        None => format!("{:<7} {:>7}  {}", row.severity.as_str(), location, row.message),
    }
}

/// One-line count of findings by severity
pub fn summary_line(result: &CheckResult) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    format!(
        "{}, {}, {}",
        plural(result.count(Severity::Error), "error"),
        plural(result.count(Severity::Warning), "warning"),
        plural(result.count(Severity::Info), "info message"),
    )
}

/// Human-readable rendering of a check: rows, then notices, then the report
pub fn format_check_result(target: &Path, result: &CheckResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", target.display());

    if result.rows.is_empty() {
        let _ = writeln!(out, "  No problems found");
    }
    for row in &result.rows {
        let _ = writeln!(out, "  {}", format_row(row));
    }

    for notice in &result.notices {
        let _ = writeln!(out, "*** {notice}");
    }
    if let Some(report) = &result.report {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", report.trim_end());
    }
    let _ = writeln!(out, "{}", summary_line(result));
    out
}

pub fn format_find_results(module: &str, found: &FindResults) -> String {
    let mut out = String::new();
    for error in &found.errors {
        let _ = writeln!(out, "error: {error}");
    }
    if found.results.is_empty() && found.errors.is_empty() {
        let _ = writeln!(out, "No source found for module '{module}'");
    }
    for path in &found.results {
        let _ = writeln!(out, "{}", path.display());
    }
    for notice in &found.notices {
        let _ = writeln!(out, "*** {notice}");
    }
    out
}
