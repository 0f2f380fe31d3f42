use regex::Regex;

use super::{OutputParser, flag_uninterpreted_failure};
use crate::types::{CapturedOutput, CheckResult, CheckRow, Location, Severity};

/// Parses `php -l <file>`.
///
/// A zero exit status means the file is clean whatever was printed.
/// Otherwise each `[PHP ]Parse error: [kind, ]message in file on line N`
/// line on stderr or stdout becomes an error row.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpLintOutputParser;

fn parse_error_regex() -> &'static Regex {
    lazy_static::lazy_static! {
        static ref PHP_RE: Regex = Regex::new(
            r"(?i)^(?:PHP\s+)?Parse\s+error:\s+(?:(?P<kind>[^,]+?),\s*)?(?P<error>.+?)\s+in\s+(?P<file>.+?)\s+on\s+line\s+(?P<line>\d+)"
        )
        .unwrap();
    }
    &PHP_RE
}

impl PhpLintOutputParser {
    fn parse_line(line: &str) -> Option<CheckRow> {
        let caps = parse_error_regex().captures(line.trim())?;
        let message = match caps.name("kind") {
            Some(kind) => format!("{}: {}", kind.as_str().trim(), &caps["error"]),
            None => caps["error"].to_string(),
        };
        Some(CheckRow::new(
            Severity::Error,
            message,
            Location::parse_line(&caps["line"]),
        ))
    }
}

impl OutputParser for PhpLintOutputParser {
    fn parse(&self, output: &CapturedOutput) -> CheckResult {
        let mut result = CheckResult::new();
        if output.success() {
            return result;
        }

        let stderr = output.stderr_text();
        let stdout = output.stdout_text();
        let rows: Vec<CheckRow> = stderr
            .lines()
            .chain(stdout.lines())
            .filter_map(Self::parse_line)
            .collect();
        result.extend_rows(rows);

        flag_uninterpreted_failure("PHP", output, &mut result);
        result
    }
}
