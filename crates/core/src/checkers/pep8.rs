use std::path::{Path, PathBuf};

use tracing::info;

use super::{Checker, ToolContext, recover_launch_failure, search_path_notice};
use crate::{
    command::ToolInvocation,
    error::Result,
    parsers::{OutputParser, Pep8OutputParser},
    process::ProcessHandle,
    types::{CheckResult, ToolName},
    utils::PackageRoot,
};

/// Style check through `python -m pycodestyle`
#[derive(Debug, Clone)]
pub struct Pep8Checker {
    context: ToolContext,
    target: PathBuf,
}

impl Pep8Checker {
    pub fn new(context: ToolContext, target: impl Into<PathBuf>) -> Self {
        Self {
            context,
            target: target.into(),
        }
    }

    fn run(&self, process: &ProcessHandle) -> Result<CheckResult> {
        let dir_vars = self.context.directory_variables(&self.target);
        let resolved = self
            .context
            .resolver()
            .resolve_with(ToolName::Pep8, &dir_vars.python_path)?;
        let package = PackageRoot::locate(&self.target, self.context.paths());

        let invocation = ToolInvocation::new(&resolved.executable, &package.root)
            .with_label(ToolName::Pep8.label())
            .with_env_overlay(resolved.env)
            .with_args(["-m", "pycodestyle"])
            .with_args(self.context.config().extra_args(ToolName::Pep8))
            .with_arg(package.relative.to_string_lossy());

        let output = self.context.runner().run_tracked(&invocation, process)?;
        let mut result = Pep8OutputParser.parse(&output);

        if let Some(notice) = search_path_notice(&dir_vars.python_path) {
            result.push_notice(notice);
        }
        result.push_notice(format!("Pep8 command line: {}", invocation.to_command_line()));

        info!("[Pep8][info] Pep8 command finished running");
        Ok(result)
    }
}

impl Checker for Pep8Checker {
    fn tool(&self) -> ToolName {
        ToolName::Pep8
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn run_check(&self, process: &ProcessHandle) -> Result<CheckResult> {
        recover_launch_failure(self.run(process))
    }
}
