//! Entry points that drive one external tool against one target.
//!
//! A checker's blocking body (`run_check`) runs on a worker thread; the
//! provided `check` method hands it to a [`Dispatcher`] so the callback
//! fires on the UI thread.

mod compile;
mod finder;
mod module_search;
mod pep8;
mod php;
mod pylint;

pub use compile::CompileChecker;
pub use finder::{FindResults, PythonModuleFinder};
pub use module_search::ModuleSearch;
pub use pep8::Pep8Checker;
pub use php::PhpChecker;
pub use pylint::PylintChecker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::{
    config::DirectoryVariables,
    dispatch::{Dispatcher, TaskHandle},
    error::{Error, Result},
    interfaces::{ConfigStore, PathResolver},
    process::{ProcessHandle, ProcessRunner},
    resolver::EnvironmentResolver,
    types::{CheckResult, ToolName},
};

/// Completion callback for a check
pub type CheckCallback = Box<dyn FnOnce(CheckResult) + Send + 'static>;

pub trait Checker: Send + Sync + 'static {
    fn tool(&self) -> ToolName;

    /// The file being checked
    fn target(&self) -> &Path;

    /// Resolve, run and parse, blocking the calling thread. A missing or
    /// unstartable interpreter comes back as an `Error` row.
    fn run_check(&self, process: &ProcessHandle) -> Result<CheckResult>;

    /// Run the check in the background; `callback` gets the result on the
    /// thread pumping the dispatcher's `UiLoop`.
    fn check(self: Arc<Self>, dispatcher: &Dispatcher, callback: CheckCallback) -> TaskHandle {
        let label = self.tool().label();
        dispatcher.dispatch_process(label, move |process| self.run_check(process), callback)
    }
}

/// Build the checker for `tool`. The module finder is not a checker.
pub fn checker_for(tool: ToolName, context: ToolContext, target: impl Into<PathBuf>) -> Option<Arc<dyn Checker>> {
    let target = target.into();
    let checker: Arc<dyn Checker> = match tool {
        ToolName::Pylint => Arc::new(PylintChecker::new(context, target)),
        ToolName::Pep8 => Arc::new(Pep8Checker::new(context, target)),
        ToolName::Compile => Arc::new(CompileChecker::new(context, target)),
        ToolName::Php => Arc::new(PhpChecker::new(context, target)),
        ToolName::Find => return None,
    };
    Some(checker)
}

/// What every checker needs to resolve and launch its tool
#[derive(Clone)]
pub struct ToolContext {
    resolver: Arc<EnvironmentResolver>,
    runner: ProcessRunner,
}

impl ToolContext {
    pub fn new(config: Arc<dyn ConfigStore>) -> Self {
        Self::from_resolver(EnvironmentResolver::new(config))
    }

    pub fn from_resolver(resolver: EnvironmentResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            runner: ProcessRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn resolver(&self) -> &EnvironmentResolver {
        &self.resolver
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.resolver.config()
    }

    pub fn paths(&self) -> &dyn PathResolver {
        self.resolver.paths()
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Directory variables for `target`. An unreadable file is logged and
    /// treated as absent.
    pub fn directory_variables(&self, target: &Path) -> DirectoryVariables {
        DirectoryVariables::load_for(target, self.paths()).unwrap_or_else(|e| {
            warn!("Ignoring unreadable directory variables for {:?}: {}", target, e);
            DirectoryVariables::default()
        })
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// Missing or unstartable interpreters are findings, not failures
pub(crate) fn recover_launch_failure(outcome: Result<CheckResult>) -> Result<CheckResult> {
    match outcome {
        Err(e @ (Error::ToolNotFound { .. } | Error::ProcessSpawnFailed { .. })) => {
            warn!("{}", e);
            Ok(CheckResult::from_error(&e))
        }
        other => other,
    }
}

/// Notice naming the extra module search path, if there is one
pub(crate) fn search_path_notice(entries: &[PathBuf]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let joined = entries
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Using PYTHONPATH + {joined}"))
}

/// Working directory for tools that run next to the file
pub(crate) fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// File name passed to tools that run next to the file
pub(crate) fn file_name_arg(target: &Path) -> String {
    target
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| target.to_string_lossy().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn test_launch_failures_become_rows() {
        let recovered = recover_launch_failure(Err(Error::ToolNotFound {
            tool: ToolName::Pylint,
            interpreter: "Python",
        }))
        .unwrap();
        assert_eq!(recovered.rows.len(), 1);
        assert_eq!(recovered.rows[0].severity, Severity::Error);

        assert!(recover_launch_failure(Err(Error::Other("x".to_string()))).is_err());
    }

    #[test]
    fn test_search_path_notice() {
        assert_eq!(search_path_notice(&[]), None);
        assert_eq!(
            search_path_notice(&[PathBuf::from("/a"), PathBuf::from("/b")]).as_deref(),
            Some("Using PYTHONPATH + /a, /b")
        );
    }

    #[test]
    fn test_find_is_not_a_checker() {
        let context = ToolContext::new(Arc::new(crate::config::Config::default()));
        assert!(checker_for(ToolName::Find, context.clone(), "a.py").is_none());
        let checker = checker_for(ToolName::Php, context, "a.php").unwrap();
        assert_eq!(checker.tool(), ToolName::Php);
        assert_eq!(checker.target(), Path::new("a.php"));
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("a.py")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/x/a.py")), PathBuf::from("/x"));
        assert_eq!(file_name_arg(Path::new("/x/a.py")), "a.py");
    }
}
