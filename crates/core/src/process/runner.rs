use std::io::Read;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{env_guard::EnvGuard, handle::ProcessHandle};
use crate::{
    command::ToolInvocation,
    error::{Error, Result},
    types::CapturedOutput,
};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How the environment overlay reaches the child
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvStrategy {
    /// Hand the overlay to the process-creation API; the parent is untouched
    #[default]
    Direct,
    /// Overwrite the parent's variables around the spawn and restore them.
    /// Calls are serialized process-wide.
    MutateAndRestore,
}

/// Runs one external tool to completion and captures what it printed
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    strategy: EnvStrategy,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: EnvStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> EnvStrategy {
        self.strategy
    }

    /// Blocking run with a private handle nobody else can terminate
    pub fn run(&self, invocation: &ToolInvocation) -> Result<CapturedOutput> {
        self.run_tracked(invocation, &ProcessHandle::new())
    }

    /// Blocking run; the spawned child is attached to `handle` so another
    /// thread can `terminate` it. A non-zero exit is returned as data.
    pub fn run_tracked(
        &self,
        invocation: &ToolInvocation,
        handle: &ProcessHandle,
    ) -> Result<CapturedOutput> {
        let label = &invocation.label;
        let program = invocation.executable();

        let mut command = Command::new(program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        // Own process group, so `terminate` also reaches grandchildren
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        debug!("[{}][info] Using CWD: {}", label, invocation.working_dir.display());
        debug!("[{}][info] Starting command: {}", label, invocation.to_command_line());

        let env = invocation.effective_env();
        let spawned = match self.strategy {
            EnvStrategy::Direct => command.envs(&env).spawn(),
            EnvStrategy::MutateAndRestore => {
                let _guard = EnvGuard::apply(&env);
                command.spawn()
            }
        };

        let mut child = spawned.map_err(|source| Error::ProcessSpawnFailed {
            program: program.display().to_string(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        handle.attach(child);

        let stderr_reader = std::thread::Builder::new()
            .name(format!("{label}-stderr"))
            .spawn(move || read_all(stderr));
        let stderr_reader = match stderr_reader {
            Ok(reader) => reader,
            Err(e) => {
                handle.terminate();
                let _ = handle.wait();
                return Err(e.into());
            }
        };

        let stdout = read_all(stdout);
        let stderr = stderr_reader.join().unwrap_or_default();
        let status = handle.wait()?;

        debug!("[{}][info] Exited with {:?}", label, status.code());
        debug!("[{}][info] stdout {}", label, String::from_utf8_lossy(&stdout));
        debug!("[{}][info] stderr {}", label, String::from_utf8_lossy(&stderr));

        Ok(CapturedOutput::new(stdout, stderr, status.code()))
    }
}

fn read_all(stream: Option<impl Read>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf) {
            debug!("Output stream closed early: {}", e);
        }
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::ToolInvocation;
    use tempfile::TempDir;

    fn sh(script: &str, dir: &std::path::Path) -> ToolInvocation {
        ToolInvocation::new("/bin/sh", dir).with_args(["-c", script])
    }

    #[test]
    fn test_captures_both_streams_and_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let output = ProcessRunner::new()
            .run(&sh("echo out; echo err >&2; exit 3", temp_dir.path()))
            .unwrap();

        assert_eq!(output.stdout_text(), "out\n");
        assert_eq!(output.stderr_text(), "err\n");
        assert_eq!(output.exit_code, Some(3));
    }

    #[test]
    fn test_working_directory_is_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let output = ProcessRunner::new()
            .run(&sh("pwd", temp_dir.path()))
            .unwrap();

        let printed = std::path::PathBuf::from(output.stdout_text().trim());
        assert_eq!(
            printed.canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_direct_env_does_not_touch_parent() {
        let temp_dir = TempDir::new().unwrap();
        let key = "CHECKRUNNER_DIRECT_OVERLAY";
        let invocation = sh("printf %s \"$CHECKRUNNER_DIRECT_OVERLAY\"", temp_dir.path())
            .with_env(key, "child-only");

        let output = ProcessRunner::new().run(&invocation).unwrap();
        assert_eq!(output.stdout_text(), "child-only");
        assert!(std::env::var_os(key).is_none());
    }

    #[test]
    fn test_search_path_is_exported() {
        let temp_dir = TempDir::new().unwrap();
        let invocation = sh("printf %s \"$PYTHONPATH\"", temp_dir.path())
            .with_search_path([std::path::PathBuf::from("/opt/lib")]);

        let output = ProcessRunner::new().run(&invocation).unwrap();
        assert_eq!(output.stdout_text(), "/opt/lib");
    }

    #[test]
    fn test_large_output_on_both_streams_does_not_deadlock() {
        let temp_dir = TempDir::new().unwrap();
        let script = "i=0; while [ $i -lt 20000 ]; do echo line-$i; echo err-$i >&2; i=$((i+1)); done";
        let output = ProcessRunner::new().run(&sh(script, temp_dir.path())).unwrap();

        assert_eq!(output.stdout_text().lines().count(), 20000);
        assert_eq!(output.stderr_text().lines().count(), 20000);
    }

    #[test]
    fn test_missing_executable_is_spawn_failure() {
        let temp_dir = TempDir::new().unwrap();
        let invocation = ToolInvocation::new("/definitely/not/here/python", temp_dir.path());
        let err = ProcessRunner::new().run(&invocation).unwrap_err();

        match err {
            Error::ProcessSpawnFailed { program, .. } => {
                assert_eq!(program, "/definitely/not/here/python")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_terminate_from_another_thread() {
        let temp_dir = TempDir::new().unwrap();
        let invocation = sh("sleep 30", temp_dir.path());
        let handle = ProcessHandle::new();

        let killer = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                while handle.pid().is_none() {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                handle.terminate();
            })
        };

        let output = ProcessRunner::new().run_tracked(&invocation, &handle).unwrap();
        killer.join().unwrap();

        assert!(handle.was_terminated());
        assert_eq!(output.exit_code, None);
    }

    #[test]
    fn test_terminate_reaches_forked_children() {
        let temp_dir = TempDir::new().unwrap();
        // The subshell keeps stdout open after `sh` itself is gone
        let invocation = sh("(sleep 4; echo done); echo after", temp_dir.path());
        let handle = ProcessHandle::new();

        let killer = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                while handle.pid().is_none() {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                std::thread::sleep(std::time::Duration::from_millis(100));
                handle.terminate();
            })
        };

        let start = std::time::Instant::now();
        let output = ProcessRunner::new().run_tracked(&invocation, &handle).unwrap();
        killer.join().unwrap();

        assert!(start.elapsed() < std::time::Duration::from_secs(2));
        assert!(handle.was_terminated());
        assert_eq!(output.exit_code, None);
        assert!(!output.stdout_text().contains("done"));
    }

    #[test]
    fn test_terminate_before_spawn_kills_on_start() {
        let temp_dir = TempDir::new().unwrap();
        let handle = ProcessHandle::new();
        handle.terminate();

        let start = std::time::Instant::now();
        let output = ProcessRunner::new()
            .run_tracked(&sh("sleep 30", temp_dir.path()), &handle)
            .unwrap();

        assert!(start.elapsed() < std::time::Duration::from_secs(5));
        assert!(handle.was_terminated());
        assert_eq!(output.exit_code, None);
    }
}
