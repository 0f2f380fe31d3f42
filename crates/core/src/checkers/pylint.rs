use std::path::{Path, PathBuf};

use tracing::info;

use super::{Checker, ToolContext, recover_launch_failure, search_path_notice};
use crate::{
    command::ToolInvocation,
    config::DirectoryVariables,
    error::Result,
    parsers::{OutputParser, PylintOutputParser},
    process::ProcessHandle,
    types::{CheckResult, ToolName},
    utils::PackageRoot,
};

/// Lints a Python file with `pylint -f parseable`, run from the top of the
/// file's package tree so imports resolve the way they do at runtime.
#[derive(Debug, Clone)]
pub struct PylintChecker {
    context: ToolContext,
    target: PathBuf,
}

impl PylintChecker {
    pub fn new(context: ToolContext, target: impl Into<PathBuf>) -> Self {
        Self {
            context,
            target: target.into(),
        }
    }

    /// Everything after `-m pylint`
    fn pylint_args(&self, dir_vars: &DirectoryVariables, module: String) -> Vec<String> {
        let mut args = vec!["-f".to_string(), "parseable".to_string()];

        if let Some(rcfile) = &dir_vars.pylintrc {
            args.push(format!("--rcfile={}", rcfile.display()));
        } else {
            let disabled = self.context.config().disabled_checks();
            if !disabled.is_empty() {
                args.push("-d".to_string());
                args.push(disabled.join(","));
            }
        }

        args.extend(self.context.config().extra_args(ToolName::Pylint));
        args.push(module);
        args
    }

    fn run(&self, process: &ProcessHandle) -> Result<CheckResult> {
        let dir_vars = self.context.directory_variables(&self.target);
        let resolved = self
            .context
            .resolver()
            .resolve_with(ToolName::Pylint, &dir_vars.python_path)?;
        let package = PackageRoot::locate(&self.target, self.context.paths());

        let invocation = ToolInvocation::new(&resolved.executable, &package.root)
            .with_label(ToolName::Pylint.label())
            .with_env_overlay(resolved.env)
            .with_args(["-m", "pylint"])
            .with_args(self.pylint_args(&dir_vars, package.module_path()));

        let output = self.context.runner().run_tracked(&invocation, process)?;
        let mut result = PylintOutputParser.parse(&output);

        if let Some(notice) = search_path_notice(&dir_vars.python_path) {
            result.push_notice(notice);
        }
        result.push_notice(format!("Pylint command line: {}", invocation.to_command_line()));
        if let Some(file) = &dir_vars.file {
            result.push_notice(format!("Directory Variables file: {}", file.display()));
        }

        info!("[Pylint][info] Pylint command finished running");
        Ok(result)
    }
}

impl Checker for PylintChecker {
    fn tool(&self) -> ToolName {
        ToolName::Pylint
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn run_check(&self, process: &ProcessHandle) -> Result<CheckResult> {
        recover_launch_failure(self.run(process))
    }
}
