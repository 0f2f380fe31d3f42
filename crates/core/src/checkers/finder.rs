use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::{ModuleSearch, ToolContext, search_path_notice};
use crate::{
    command::ToolInvocation,
    dispatch::{Dispatcher, FromFault, TaskHandle},
    error::{Error, Result},
    parsers::{parse_sys_path, sys_path::SYS_PATH_SCRIPT},
    process::ProcessHandle,
    types::{CheckResult, CheckRow, Severity, ToolName},
};

/// Outcome of a module search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FindResults {
    /// Matching source files, one per case-insensitive spelling, sorted
    /// ignoring case
    pub results: Vec<PathBuf>,
    pub notices: Vec<String>,
    pub errors: BTreeSet<String>,
}

impl FindResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `paths`, keeping the first spelling of names that differ only
    /// in case
    pub fn set_results(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        let mut unique: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in self.results.drain(..).chain(paths) {
            let key = path.to_string_lossy().to_lowercase();
            unique.entry(key).or_insert(path);
        }
        self.results = unique.into_values().collect();
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.errors.is_empty()
    }
}

impl FromFault for FindResults {
    fn from_fault(error: &Error) -> Self {
        let mut results = Self::new();
        results.errors.insert(error.to_string());
        results
    }
}

impl From<FindResults> for CheckResult {
    fn from(found: FindResults) -> Self {
        let mut result = CheckResult::new();
        for error in &found.errors {
            result.push_fatal(error.clone());
        }
        result.extend_rows(
            found
                .results
                .iter()
                .map(|path| CheckRow::new(Severity::Info, path.display().to_string(), None)),
        );
        result.notices = found.notices;
        result
    }
}

/// Callback for a module search
pub type FindCallback = Box<dyn FnOnce(FindResults) + Send + 'static>;

/// Locates the source files of a Python module by name.
///
/// The search path is the one the configured interpreter reports, with the
/// directory variables' `PYTHONPATH` applied and `local_dir` searched first.
#[derive(Debug, Clone)]
pub struct PythonModuleFinder {
    context: ToolContext,
    module: String,
    local_dir: Option<PathBuf>,
    first_match: bool,
    context_file: Option<PathBuf>,
}

impl PythonModuleFinder {
    pub fn new(context: ToolContext, module: impl Into<String>) -> Self {
        Self {
            context,
            module: module.into(),
            local_dir: None,
            first_match: false,
            context_file: None,
        }
    }

    pub fn with_local_dir(mut self, local_dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(local_dir.into());
        self
    }

    pub fn with_first_match(mut self, first_match: bool) -> Self {
        self.first_match = first_match;
        self
    }

    /// File whose directory variables supply the extra `PYTHONPATH`
    pub fn with_context_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.context_file = Some(file.into());
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    fn working_dir(&self) -> PathBuf {
        self.local_dir
            .clone()
            .or_else(|| self.context_file.as_deref().map(super::parent_dir))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Blocking search. Launch and output problems are reported in
    /// `FindResults::errors`.
    pub fn run_find(&self, process: &ProcessHandle) -> FindResults {
        let mut found = FindResults::new();
        if let Err(e) = self.search(process, &mut found) {
            info!("[PyFind][info] Error: {}", e);
            found.errors.insert(e.to_string());
        }
        found
    }

    fn search(&self, process: &ProcessHandle, found: &mut FindResults) -> Result<()> {
        let dir_vars = match &self.context_file {
            Some(file) => self.context.directory_variables(file),
            None => Default::default(),
        };
        let resolved = self
            .context
            .resolver()
            .resolve_with(ToolName::Find, &dir_vars.python_path)?;

        let invocation = ToolInvocation::new(&resolved.executable, self.working_dir())
            .with_label(ToolName::Find.label())
            .with_env_overlay(resolved.env)
            .with_args(["-c", SYS_PATH_SCRIPT]);

        let output = self.context.runner().run_tracked(&invocation, process)?;
        let sys_path = parse_sys_path(&output)?;

        if let Some(notice) = search_path_notice(&dir_vars.python_path) {
            found.notices.push(notice);
        }
        found
            .notices
            .push(format!("PyFind command line: {}", invocation.to_command_line()));
        if let Some(file) = &dir_vars.file {
            found
                .notices
                .push(format!("Directory Variables file: {}", file.display()));
        }

        let roots: Vec<PathBuf> = self.local_dir.iter().cloned().chain(sys_path).collect();
        debug!("[PyFind][info] Searching {} roots for {:?}", roots.len(), self.module);
        let search = ModuleSearch::new(roots).first_match(self.first_match);
        found.set_results(search.find(&self.module));
        Ok(())
    }

    /// Search in the background and hand the results to `callback` on the
    /// UI thread
    pub fn find(self: Arc<Self>, dispatcher: &Dispatcher, callback: FindCallback) -> TaskHandle {
        dispatcher.dispatch_process(
            ToolName::Find.label(),
            move |process| Ok(self.run_find(process)),
            callback,
        )
    }
}
