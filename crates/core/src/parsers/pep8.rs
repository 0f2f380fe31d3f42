use regex::Regex;
use tracing::debug;

use super::{OutputParser, flag_uninterpreted_failure, reports_missing_module};
use crate::types::{CapturedOutput, CheckResult, CheckRow, Location, Severity};

/// Message shown when the style checker itself cannot be imported
pub const NO_PEP8: &str = "No Pep8 configured or found";

/// Parses `pep8` / `pycodestyle` default output:
/// `[path:]line:col: CODE text`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pep8OutputParser;

fn line_regex() -> &'static Regex {
    lazy_static::lazy_static! {
        static ref PEP8_RE: Regex = Regex::new(
            r"^(?:(?P<path>.*?):)?(?P<line>[^:]*):(?P<col>[^:]*): (?P<letter>[A-Z])(?P<num>\d*) (?P<text>.*)$"
        )
        .unwrap();
    }
    &PEP8_RE
}

impl Pep8OutputParser {
    fn parse_line(line: &str) -> Option<CheckRow> {
        let caps = line_regex().captures(line)?;
        let col = caps["col"].trim();
        let letter = caps["letter"].chars().next()?;

        let location = Location::parse_line(&caps["line"]).map(|loc| match col.parse::<u32>() {
            Ok(column) => Location::with_column(loc.line, column),
            Err(_) => loc,
        });

        let row = CheckRow::new(
            Severity::from_code_letter(letter),
            format!("{}: {}", col, &caps["text"]),
            location,
        )
        .with_code(format!("{}{}", letter, &caps["num"]));
        Some(row)
    }
}

impl OutputParser for Pep8OutputParser {
    fn parse(&self, output: &CapturedOutput) -> CheckResult {
        let mut result = CheckResult::new();

        if reports_missing_module(&output.stderr_text(), &["pep8", "pycodestyle"]) {
            result.push_fatal(NO_PEP8);
            return result;
        }

        let stdout = output.stdout_text();
        let rows: Vec<CheckRow> = stdout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter_map(Self::parse_line)
            .collect();
        debug!("[Pep8][info] Parsed {} rows", rows.len());
        result.extend_rows(rows);

        flag_uninterpreted_failure("Pep8", output, &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(stdout: &str, exit_code: i32) -> CheckResult {
        Pep8OutputParser.parse(&CapturedOutput::new(stdout, "", Some(exit_code)))
    }

    #[test]
    fn test_pathless_syntax_error() {
        let result = parse("3:5: E999 syntax error\n", 1);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.severity, Severity::Error);
        assert_eq!(row.message, "5: syntax error");
        assert_eq!(row.location.map(|l| l.line), Some(3));
        assert_eq!(row.code.as_deref(), Some("E999"));
    }

    #[test]
    fn test_paths_and_message_classes() {
        let stdout = "pkg/mod.py:12:80: E501 line too long (99 > 79 characters)\r\n\
                      pkg/mod.py:4:1: W391 blank line at end of file\r\n\
                      pkg/mod.py:1:1: E265 block comment should start with '# '\r\n\
                      pkg/mod.py:7:3: C901 'f' is too complex (12)\r\n";
        let result = parse(stdout, 1);

        let summary: Vec<_> = result
            .rows
            .iter()
            .map(|r| (r.severity, r.location.map(|l| l.line), r.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Severity::Error, Some(1), "1: block comment should start with '# '"),
                (Severity::Error, Some(12), "80: line too long (99 > 79 characters)"),
                (Severity::Warning, Some(4), "1: blank line at end of file"),
                (Severity::Info, Some(7), "3: 'f' is too complex (12)"),
            ]
        );
    }

    #[test]
    fn test_windows_drive_paths() {
        let result = parse(r"C:\work\a.py:2:1: E302 expected 2 blank lines", 1);
        assert_eq!(result.rows[0].location, Some(Location::with_column(2, 1)));
    }

    #[test]
    fn test_bad_line_number_keeps_row_unlocated() {
        let result = parse("a.py:NA:1: E999 odd\na.py:2:1: E111 indent\n", 1);

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].location, None);
        assert_eq!(result.rows[0].message, "1: odd");
        assert_eq!(result.rows[1].location.map(|l| l.line), Some(2));
    }

    #[test]
    fn test_duplicates_collapse() {
        let result = parse("a.py:2:1: E302 x\na.py:2:1: E302 x\n", 1);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_clean_file_has_no_rows() {
        assert!(parse("", 0).is_empty());
    }

    #[test]
    fn test_missing_module_is_fatal() {
        let output = CapturedOutput::new(
            "",
            "Traceback (most recent call last):\n  File \"<string>\", line 1\nImportError: No module named pep8\n",
            Some(1),
        );
        let result = Pep8OutputParser.parse(&output);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].message, NO_PEP8);
        assert!(result.errors.contains(NO_PEP8));
    }

    #[test]
    fn test_unparseable_failure_is_unknown_error() {
        let output = CapturedOutput::new("", "pycodestyle: error: no such option: --bogus\n", Some(2));
        let result = Pep8OutputParser.parse(&output);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(
            result.rows[0].message,
            "Unknown Error: pycodestyle: error: no such option: --bogus"
        );
    }
}
