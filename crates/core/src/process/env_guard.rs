//! Temporary overwrite of the parent's environment for spawn APIs that can
//! only inherit it.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use crate::command::EnvOverlay;

/// Serializes every mutate/restore window in the process
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Holds the environment lock while `overlay` is applied and puts the
/// previous values back on drop, including after a failed spawn.
pub(crate) struct EnvGuard {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub(crate) fn apply(overlay: &EnvOverlay) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut saved = Vec::with_capacity(overlay.len());

        for (key, value) in overlay {
            saved.push((key.clone(), std::env::var_os(key)));
            tracing::debug!("Temporarily setting {}={:?}", key, value);
            // SAFETY: every writer in this crate goes through ENV_LOCK, which
            // is held until the guard restores the previous values.
            unsafe { std::env::set_var(key, value) };
        }

        Self { saved, _lock: lock }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: ENV_LOCK is still held; `_lock` is dropped after this body.
            match previous {
                Some(value) => unsafe { std::env::set_var(&key, value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}
