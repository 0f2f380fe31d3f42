//! Turning raw tool output into `CheckResult` rows.
//!
//! Every parser here is total: empty, truncated or binary output still
//! produces a result. Rows are de-duplicated and ordered by `CheckResult`.

pub mod compile;
pub mod pep8;
pub mod php;
pub mod pylint;
pub mod sys_path;

pub use compile::CompileOutputParser;
pub use pep8::Pep8OutputParser;
pub use php::PhpLintOutputParser;
pub use pylint::PylintOutputParser;
pub use sys_path::parse_sys_path;

use tracing::warn;

use crate::{
    error::Error,
    types::{CapturedOutput, CheckResult},
};

/// Converts the captured output of one tool run into findings
pub trait OutputParser: Send + Sync {
    fn parse(&self, output: &CapturedOutput) -> CheckResult;
}

/// True when `stderr` reports a failed import that names one of `modules`
/// somewhere after the error marker.
pub(crate) fn reports_missing_module(stderr: &str, modules: &[&str]) -> bool {
    let lower = stderr.to_lowercase();
    ["importerror", "modulenotfounderror", "no module named"].iter().any(|marker| {
        lower.find(marker).is_some_and(|index| {
            let rest = &lower[index..];
            modules.iter().any(|module| rest.contains(module))
        })
    })
}

/// Add an `Unknown Error` row when the tool failed but none of its output
/// could be interpreted.
pub(crate) fn flag_uninterpreted_failure(tool: &str, output: &CapturedOutput, result: &mut CheckResult) {
    if !result.rows.is_empty() || output.success() {
        return;
    }

    let stderr = output.stderr_text();
    let stdout = output.stdout_text();
    let summary = stderr
        .lines()
        .rev()
        .chain(stdout.lines())
        .map(str::trim)
        .find(|line| !line.is_empty());

    let Some(summary) = summary else {
        return;
    };

    let anomaly = Error::OutputParseAnomaly(summary.to_string());
    warn!("[{}][warn] {} (exit code {:?})", tool, anomaly, output.exit_code);
    result.push_fatal(anomaly.to_string());
}
