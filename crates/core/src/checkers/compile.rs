use std::path::{Path, PathBuf};

use super::{Checker, ToolContext, file_name_arg, parent_dir, recover_launch_failure};
use crate::{
    command::ToolInvocation,
    error::Result,
    parsers::{CompileOutputParser, OutputParser},
    process::ProcessHandle,
    types::{CheckResult, ToolName},
};

/// `python -m py_compile <file>`, run from the file's directory.
/// Used for the compile-on-save check.
#[derive(Debug, Clone)]
pub struct CompileChecker {
    context: ToolContext,
    target: PathBuf,
}

impl CompileChecker {
    pub fn new(context: ToolContext, target: impl Into<PathBuf>) -> Self {
        Self {
            context,
            target: target.into(),
        }
    }

    fn run(&self, process: &ProcessHandle) -> Result<CheckResult> {
        let resolved = self.context.resolver().resolve(ToolName::Compile)?;

        let invocation = ToolInvocation::new(&resolved.executable, parent_dir(&self.target))
            .with_label(ToolName::Compile.label())
            .with_env_overlay(resolved.env)
            .with_args(["-m", "py_compile"])
            .with_arg(file_name_arg(&self.target));

        let output = self.context.runner().run_tracked(&invocation, process)?;
        let mut result = CompileOutputParser.parse(&output);
        result.push_notice(format!("Compile command line: {}", invocation.to_command_line()));
        Ok(result)
    }
}

impl Checker for CompileChecker {
    fn tool(&self) -> ToolName {
        ToolName::Compile
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn run_check(&self, process: &ProcessHandle) -> Result<CheckResult> {
        recover_launch_failure(self.run(process))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::checkers::test_support::{fake_interpreter, python_context};
    use crate::types::Location;
    use tempfile::TempDir;

    #[test]
    fn test_compile_error_is_located() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("broken.py");
        std::fs::write(&target, "def f(:\n").unwrap();
        let bin = TempDir::new().unwrap();
        let python = fake_interpreter(
            bin.path(),
            "python",
            "printf '  File \"%s\", line 1\\n    def f(:\\n          ^\\nSyntaxError: invalid syntax\\n' \"$3\" >&2; exit 1",
        );

        let result = CompileChecker::new(python_context(&python), &target)
            .run_check(&ProcessHandle::new())
            .unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].location, Some(Location::line(1)));
        assert_eq!(result.rows[0].message, "SyntaxError: invalid syntax");
        assert!(result.notices[0].ends_with("-m py_compile broken.py"));
    }

    #[test]
    fn test_clean_compile() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ok.py");
        std::fs::write(&target, "x = 1\n").unwrap();
        let bin = TempDir::new().unwrap();
        let python = fake_interpreter(bin.path(), "python", "exit 0");

        let result = CompileChecker::new(python_context(&python), &target)
            .run_check(&ProcessHandle::new())
            .unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_syntax_warning_on_clean_compile() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ok.py");
        std::fs::write(&target, "s = \"\\d\"\n").unwrap();
        let bin = TempDir::new().unwrap();
        let python = fake_interpreter(
            bin.path(),
            "python",
            "printf '%s:1: SyntaxWarning: invalid escape sequence\\n  s = 1\\n' \"$3\" >&2; exit 0",
        );

        let result = CompileChecker::new(python_context(&python), &target)
            .run_check(&ProcessHandle::new())
            .unwrap();

        assert!(!result.has_errors());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].severity, crate::types::Severity::Warning);
        assert_eq!(result.rows[0].location, Some(Location::line(1)));
    }
}
