use regex::Regex;

use super::{OutputParser, flag_uninterpreted_failure};
use crate::types::{CapturedOutput, CheckResult, CheckRow, Location, Severity};

/// Parses what `python -m py_compile <file>` writes to stderr.
///
/// Stderr text from a failed compile is an error. The line comes from the
/// last `File "x", line N` frame, or from the older `('x', N, ...)` tuple
/// form. A clean compile can still print `file:N: SyntaxWarning: ...`, which
/// becomes a warning row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOutputParser;

fn error_line(stderr: &str) -> Option<Location> {
    lazy_static::lazy_static! {
        static ref FRAME_RE: Regex = Regex::new(r#"File "[^"]*", line (\d+)"#).unwrap();
        static ref TUPLE_RE: Regex = Regex::new(r"\('[^']*', (\d+),").unwrap();
    }

    FRAME_RE
        .captures_iter(stderr)
        .last()
        .or_else(|| TUPLE_RE.captures(stderr))
        .and_then(|caps| Location::parse_line(&caps[1]))
}

fn warning_row(stderr: &str) -> Option<CheckRow> {
    lazy_static::lazy_static! {
        static ref WARNING_RE: Regex = Regex::new(r":(\d+): (\w*Warning: .*)$").unwrap();
    }

    stderr
        .lines()
        .map(str::trim)
        .find_map(|line| WARNING_RE.captures(line))
        .map(|caps| CheckRow::new(Severity::Warning, &caps[2], Location::parse_line(&caps[1])))
}

impl OutputParser for CompileOutputParser {
    fn parse(&self, output: &CapturedOutput) -> CheckResult {
        let mut result = CheckResult::new();
        let stderr = output.stderr_text();

        if output.success() {
            result.extend_rows(warning_row(&stderr));
            return result;
        }

        let message = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last();

        if let Some(message) = message {
            result.extend_rows([CheckRow::new(
                Severity::Error,
                message,
                error_line(&stderr),
            )]);
        }

        flag_uninterpreted_failure("CompileCheck", output, &mut result);
        result
    }
}
