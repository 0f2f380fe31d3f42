use regex::Regex;
use tracing::debug;

use super::{OutputParser, flag_uninterpreted_failure, reports_missing_module};
use crate::types::{CapturedOutput, CheckResult, CheckRow, Location, Severity};

pub const NO_PYLINT: &str = "No Pylint configured or found";

/// Parses `pylint -f parseable` output:
/// `path:line: [X[NNNN][(symbol)][, obj]] text`
///
/// Message classes map as `E`/`F` error, `W` warning, and everything else
/// (convention, refactor, information) info. Whatever follows the last
/// finding, starting at a `Report` heading, is kept as the report text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PylintOutputParser;

fn message_regex() -> &'static Regex {
    lazy_static::lazy_static! {
        static ref PYLINT_RE: Regex = Regex::new(
            r"(?m)^(?P<path>.*?):(?P<line>[^:\n]*): \[(?P<letter>[A-Z])(?P<num>\d*)(?:\([^)\n]*\))?(?:,\s*(?P<obj>[^\]\n]*))?\] (?P<text>.*)$"
        )
        .unwrap();
    }
    &PYLINT_RE
}

impl OutputParser for PylintOutputParser {
    fn parse(&self, output: &CapturedOutput) -> CheckResult {
        let mut result = CheckResult::new();

        if reports_missing_module(&output.stderr_text(), &["pylint"]) {
            result.push_fatal(NO_PYLINT);
            return result;
        }

        let stdout = output.stdout_text().replace('\r', "");
        let mut rows = Vec::new();
        let mut last_match_end = 0;

        for caps in message_regex().captures_iter(&stdout) {
            let Some(letter) = caps["letter"].chars().next() else {
                continue;
            };
            if let Some(whole) = caps.get(0) {
                last_match_end = whole.end();
            }

            let text = caps["text"].trim_end();
            let message = match caps.name("obj").map(|m| m.as_str().trim()) {
                Some(obj) if !obj.is_empty() => format!("[{obj}] {text}"),
                _ => text.to_string(),
            };

            rows.push(
                CheckRow::new(
                    Severity::from_code_letter(letter),
                    message,
                    Location::parse_line(&caps["line"]),
                )
                .with_code(format!("{}{}", letter, &caps["num"])),
            );
        }

        debug!("[Pylint][info] Parsed {} rows", rows.len());
        result.extend_rows(rows);

        if let Some(index) = stdout[last_match_end..].find("Report") {
            result.report = Some(stdout[last_match_end + index..].to_string());
        }

        flag_uninterpreted_failure("Pylint", output, &mut result);
        result
    }
}
