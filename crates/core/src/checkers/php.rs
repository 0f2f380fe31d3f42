use std::path::{Path, PathBuf};

use super::{Checker, ToolContext, file_name_arg, parent_dir, recover_launch_failure};
use crate::{
    command::ToolInvocation,
    error::Result,
    parsers::{OutputParser, PhpLintOutputParser},
    process::ProcessHandle,
    types::{CheckResult, ToolName},
};

/// Syntax check through `php -l <file>`
#[derive(Debug, Clone)]
pub struct PhpChecker {
    context: ToolContext,
    target: PathBuf,
}

impl PhpChecker {
    pub fn new(context: ToolContext, target: impl Into<PathBuf>) -> Self {
        Self {
            context,
            target: target.into(),
        }
    }

    fn run(&self, process: &ProcessHandle) -> Result<CheckResult> {
        let resolved = self.context.resolver().resolve(ToolName::Php)?;

        let invocation = ToolInvocation::new(&resolved.executable, parent_dir(&self.target))
            .with_label(ToolName::Php.label())
            .with_env_overlay(resolved.env)
            .with_arg("-l")
            .with_args(self.context.config().extra_args(ToolName::Php))
            .with_arg(file_name_arg(&self.target));

        let output = self.context.runner().run_tracked(&invocation, process)?;
        let mut result = PhpLintOutputParser.parse(&output);
        result.push_notice(format!("PHP command line: {}", invocation.to_command_line()));
        Ok(result)
    }
}

impl Checker for PhpChecker {
    fn tool(&self) -> ToolName {
        ToolName::Php
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn run_check(&self, process: &ProcessHandle) -> Result<CheckResult> {
        recover_launch_failure(self.run(process))
    }
}
