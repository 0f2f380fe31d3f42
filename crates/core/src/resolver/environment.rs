use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    command::EnvOverlay,
    error::{Error, Result},
    interfaces::{ConfigStore, PathResolver},
    services::DefaultPathResolver,
    types::ToolName,
};

/// Where a resolved executable came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Configured,
    SearchPath,
}

/// An executable ready to launch plus the environment overlay it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub tool: ToolName,
    pub executable: PathBuf,
    pub env: EnvOverlay,
    pub source: ResolutionSource,
}

/// Finds the interpreter behind a logical tool name.
///
/// Resolution never mutates the process environment: the inherited `PATH`
/// and `PYTHONPATH` are captured once at construction and can be replaced
/// for tests.
pub struct EnvironmentResolver {
    config: Arc<dyn ConfigStore>,
    paths: Arc<dyn PathResolver>,
    search_path: Option<OsString>,
    inherited_pythonpath: Option<OsString>,
}

impl EnvironmentResolver {
    pub fn new(config: Arc<dyn ConfigStore>) -> Self {
        Self {
            config,
            paths: Arc::new(DefaultPathResolver::new()),
            search_path: std::env::var_os("PATH"),
            inherited_pythonpath: std::env::var_os("PYTHONPATH"),
        }
    }

    pub fn with_path_resolver(mut self, paths: Arc<dyn PathResolver>) -> Self {
        self.paths = paths;
        self
    }

    /// Replace the `PATH` value searched for default executables
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Replace the `PYTHONPATH` value appended after extra entries
    pub fn with_inherited_pythonpath(mut self, pythonpath: Option<OsString>) -> Self {
        self.inherited_pythonpath = pythonpath;
        self
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.config.as_ref()
    }

    pub fn paths(&self) -> &dyn PathResolver {
        self.paths.as_ref()
    }

    /// Resolve `tool` with no extra module search path
    pub fn resolve(&self, tool: ToolName) -> Result<ResolvedTool> {
        self.resolve_with(tool, &[])
    }

    /// Resolve `tool`, exporting `extra_search_path` ahead of any inherited
    /// `PYTHONPATH` in the overlay.
    pub fn resolve_with(&self, tool: ToolName, extra_search_path: &[PathBuf]) -> Result<ResolvedTool> {
        let interpreter = tool.interpreter();
        let not_found = || Error::ToolNotFound {
            tool,
            interpreter: interpreter.label(),
        };

        let (executable, source) = match self.config.interpreter_path(tool) {
            Some(configured) => {
                let executable = self.locate_configured(&configured).ok_or_else(|| {
                    warn!("[{tool}][warn] Configured interpreter {:?} is not usable", configured);
                    not_found()
                })?;
                (executable, ResolutionSource::Configured)
            }
            None => {
                let executable = interpreter
                    .default_executables()
                    .iter()
                    .find_map(|name| self.which(name))
                    .ok_or_else(|| {
                        info!("[{tool}][info] No local {} configured or found", interpreter.label());
                        not_found()
                    })?;
                (executable, ResolutionSource::SearchPath)
            }
        };

        info!("[{tool}][info] Using {}: {}", interpreter.label(), executable.display());

        Ok(ResolvedTool {
            tool,
            executable,
            env: self.env_overlay(extra_search_path),
            source,
        })
    }

    /// A configured value is either a path to an executable or a bare
    /// command name to look up on `PATH`.
    fn locate_configured(&self, configured: &Path) -> Option<PathBuf> {
        if configured.components().count() > 1 || configured.is_absolute() {
            self.paths
                .is_executable(configured)
                .then(|| configured.to_path_buf())
        } else {
            self.which(&configured.to_string_lossy())
        }
    }

    /// Search the captured `PATH` for `name` (with the platform suffix)
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);

        std::env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(&file_name))
            .find(|candidate| self.paths.is_executable(candidate))
            .inspect(|found| debug!("Found {} at {:?}", name, found))
    }

    fn env_overlay(&self, extra_search_path: &[PathBuf]) -> EnvOverlay {
        let mut env = EnvOverlay::new();
        if extra_search_path.is_empty() {
            return env;
        }

        let mut entries: Vec<PathBuf> = extra_search_path.to_vec();
        if let Some(inherited) = &self.inherited_pythonpath {
            entries.extend(std::env::split_paths(inherited).filter(|p| !p.as_os_str().is_empty()));
        }

        match std::env::join_paths(&entries) {
            Ok(joined) => {
                env.insert("PYTHONPATH".to_string(), joined);
            }
            Err(e) => warn!("Cannot export PYTHONPATH: {}", e),
        }
        env
    }
}
