use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variables layered over the inherited environment of a child
pub type EnvOverlay = BTreeMap<String, OsString>;

/// Fully resolved description of one external process launch.
///
/// The working directory is mandatory so a check never depends on whatever
/// directory the host happens to be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Extra module search path entries, exported as `PYTHONPATH`
    pub search_path: Vec<PathBuf>,
    /// Replaces `program` when set (a per-invocation interpreter choice)
    pub interpreter_override: Option<PathBuf>,
    pub env: EnvOverlay,
    /// Short label used in log lines, e.g. "Pylint"
    pub label: String,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let label = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "tool".to_string());
        Self {
            program,
            args: Vec::new(),
            working_dir: working_dir.into(),
            search_path: Vec::new(),
            interpreter_override: None,
            env: EnvOverlay::new(),
            label,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_search_path(mut self, entries: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_path.extend(entries);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_env_overlay(mut self, overlay: EnvOverlay) -> Self {
        self.env.extend(overlay);
        self
    }

    pub fn with_interpreter_override(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter_override = Some(interpreter.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The executable that will actually be started
    pub fn executable(&self) -> &Path {
        self.interpreter_override.as_deref().unwrap_or(&self.program)
    }

    /// Environment handed to the child: the explicit overlay plus
    /// `PYTHONPATH` built from `search_path`.
    ///
    /// An existing `PYTHONPATH` in the overlay wins over `search_path`.
    pub fn effective_env(&self) -> EnvOverlay {
        let mut env = self.env.clone();
        if !self.search_path.is_empty() && !env.contains_key("PYTHONPATH") {
            match std::env::join_paths(&self.search_path) {
                Ok(joined) => {
                    env.insert("PYTHONPATH".to_string(), joined);
                }
                Err(e) => {
                    tracing::warn!("[{}] Ignoring unusable search path: {}", self.label, e);
                }
            }
        }
        env
    }

    /// Command line for display and logging, quoting arguments with spaces
    pub fn to_command_line(&self) -> String {
        let mut cmd = self.executable().to_string_lossy().to_string();
        for arg in &self.args {
            cmd.push(' ');
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_command_line() {
        let inv = ToolInvocation::new("/usr/bin/python3", "/tmp")
            .with_args(["-m", "py_compile"])
            .with_arg("my file.py");

        assert_eq!(inv.label, "python3");
        assert_eq!(inv.working_dir, PathBuf::from("/tmp"));
        assert_eq!(
            inv.to_command_line(),
            "/usr/bin/python3 -m py_compile 'my file.py'"
        );
    }

    #[test]
    fn test_interpreter_override_replaces_program() {
        let inv = ToolInvocation::new("python", ".").with_interpreter_override("/opt/py/bin/python");
        assert_eq!(inv.executable(), Path::new("/opt/py/bin/python"));
        assert!(inv.to_command_line().starts_with("/opt/py/bin/python"));
    }

    #[test]
    fn test_search_path_becomes_pythonpath() {
        let inv = ToolInvocation::new("python", ".")
            .with_search_path([PathBuf::from("/a"), PathBuf::from("/b")]);
        let env = inv.effective_env();
        let expected = std::env::join_paths(["/a", "/b"]).unwrap();
        assert_eq!(env.get("PYTHONPATH"), Some(&expected));
    }

    #[test]
    fn test_explicit_pythonpath_wins() {
        let inv = ToolInvocation::new("python", ".")
            .with_search_path([PathBuf::from("/a")])
            .with_env("PYTHONPATH", "/explicit");
        assert_eq!(
            inv.effective_env().get("PYTHONPATH"),
            Some(&OsString::from("/explicit"))
        );
    }
}
