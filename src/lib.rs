//! Fixtures shared by the cross-crate integration tests in `tests/`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use checkrunner_core::{Config, ToolContext};

/// Write an executable shell script standing in for an interpreter
#[cfg(unix)]
pub fn fake_interpreter(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Context whose Python tools all run `python`
pub fn python_context(python: &Path) -> ToolContext {
    ToolContext::new(Arc::new(Config {
        python_path: Some(python.to_path_buf()),
        ..Default::default()
    }))
}
