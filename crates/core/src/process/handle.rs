use std::io;
use std::process::{Child, ExitStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

/// How often `wait` re-checks a child that has closed its output streams
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct HandleState {
    child: Option<Child>,
    pid: Option<u32>,
    started: Option<Instant>,
    exit: Option<ExitStatus>,
    terminated: bool,
    /// `terminate` arrived before a child was attached
    terminate_requested: bool,
}

impl HandleState {
    /// Kill the attached child and, on unix, the process group it leads
    fn kill(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };

        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                kill_process_group(pid);
            }
        }

        match child.kill() {
            Ok(()) => {
                debug!("terminate: killed process {:?}", self.pid);
                self.terminated = true;
            }
            Err(e) => debug!("terminate: ignoring kill failure for {:?}: {}", self.pid, e),
        }
    }
}

/// The runner starts every child as the leader of its own process group, so
/// killing the group also stops anything the tool forked.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = i32::try_from(pid) else {
        return;
    };
    // SAFETY: plain syscall. The child is not reaped yet (its exit status is
    // still unknown under the handle lock), so its pid cannot be reused.
    let res = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if res != 0 {
        debug!("terminate: no process group {} to signal", pgid);
    }
}

/// Shared view of one child process.
///
/// The runner attaches the child once it is spawned; any clone may call
/// `terminate` from another thread while the runner waits. A terminate that
/// comes before the spawn is remembered and kills the child on attach.
/// Attaching a new child starts a fresh run on the same handle.
#[derive(Debug, Clone, Default)]
pub struct ProcessHandle {
    inner: Arc<Mutex<HandleState>>,
}

impl ProcessHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn attach(&self, child: Child) {
        let mut state = self.state();
        state.pid = Some(child.id());
        state.started = Some(Instant::now());
        state.child = Some(child);
        state.exit = None;
        state.terminated = false;

        if std::mem::take(&mut state.terminate_requested) {
            debug!("terminate: process {:?} was cancelled before it started", state.pid);
            state.kill();
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.state().pid
    }

    /// Time since the child was spawned, `None` before that
    pub fn elapsed(&self) -> Option<Duration> {
        self.state().started.map(|started| started.elapsed())
    }

    pub fn is_running(&self) -> bool {
        let state = self.state();
        state.child.is_some() && state.exit.is_none()
    }

    /// True once `terminate` actually killed a live child
    pub fn was_terminated(&self) -> bool {
        self.state().terminated
    }

    /// Best-effort kill. Before a child is attached the request is kept and
    /// applied on attach; after the child exited this is a no-op. Platform
    /// errors are swallowed.
    pub fn terminate(&self) {
        let mut guard = self.state();
        let state = &mut *guard;

        if state.exit.is_some() {
            debug!("terminate: process {:?} already exited", state.pid);
            return;
        }
        let Some(child) = state.child.as_mut() else {
            debug!("terminate: no process attached yet, killing it on start");
            state.terminate_requested = true;
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("terminate: process {:?} exited before kill", state.pid);
                state.exit = Some(status);
            }
            _ => state.kill(),
        }
    }

    /// Reap the attached child. The lock is released between polls so
    /// `terminate` is never blocked behind a waiting runner.
    pub(crate) fn wait(&self) -> io::Result<ExitStatus> {
        loop {
            {
                let mut guard = self.state();
                let state = &mut *guard;
                if let Some(status) = state.exit {
                    return Ok(status);
                }
                let child = state
                    .child
                    .as_mut()
                    .ok_or_else(|| io::Error::other("no process attached"))?;
                if let Some(status) = child.try_wait()? {
                    state.exit = Some(status);
                    return Ok(status);
                }
            }
            std::thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminate_without_process_is_noop() {
        let handle = ProcessHandle::new();
        handle.terminate();
        assert!(!handle.is_running());
        assert!(!handle.was_terminated());
        assert_eq!(handle.pid(), None);
        assert_eq!(handle.elapsed(), None);
    }

    #[test]
    fn test_wait_without_process_is_error() {
        assert!(ProcessHandle::new().wait().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_after_exit_is_noop() {
        let child = std::process::Command::new("/bin/sh")
            .args(["-c", "exit 0"])
            .spawn()
            .unwrap();
        let handle = ProcessHandle::new();
        handle.attach(child);

        let status = handle.wait().unwrap();
        assert!(status.success());

        handle.terminate();
        handle.terminate();
        assert!(!handle.was_terminated());
        assert!(!handle.is_running());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_running_process() {
        let child = std::process::Command::new("/bin/sh")
            .args(["-c", "sleep 30"])
            .spawn()
            .unwrap();
        let handle = ProcessHandle::new();
        handle.attach(child);
        assert!(handle.is_running());

        handle.terminate();
        let status = handle.wait().unwrap();
        assert!(!status.success());
        assert!(handle.was_terminated());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_before_attach_kills_on_start() {
        let handle = ProcessHandle::new();
        handle.terminate();
        assert!(!handle.was_terminated());

        let child = std::process::Command::new("/bin/sh")
            .args(["-c", "sleep 30"])
            .spawn()
            .unwrap();
        handle.attach(child);

        let start = Instant::now();
        let status = handle.wait().unwrap();
        assert!(!status.success());
        assert!(handle.was_terminated());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_attach_starts_a_fresh_run() {
        let handle = ProcessHandle::new();
        let first = std::process::Command::new("/bin/sh")
            .args(["-c", "exit 0"])
            .spawn()
            .unwrap();
        handle.attach(first);
        assert!(handle.wait().unwrap().success());

        let second = std::process::Command::new("/bin/sh")
            .args(["-c", "exit 4"])
            .spawn()
            .unwrap();
        handle.attach(second);
        assert_eq!(handle.wait().unwrap().code(), Some(4));
        assert!(!handle.was_terminated());
    }
}
