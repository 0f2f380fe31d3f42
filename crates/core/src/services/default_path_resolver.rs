//! Default path resolver implementation
//!
//! Provides standard file system based path resolution.

use crate::interfaces::PathResolver;
use std::path::{Component, Path, PathBuf};

/// Default implementation of PathResolver using std::fs
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPathResolver;

impl DefaultPathResolver {
    pub fn new() -> Self {
        Self
    }
}

impl PathResolver for DefaultPathResolver {
    fn resolve_relative(&self, base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.normalize(&base.join(relative))
        }
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    if matches!(components.last(), Some(Component::Normal(_))) {
                        components.pop();
                    } else if components.is_empty() {
                        components.push(component);
                    }
                }
                Component::CurDir => {}
                c => components.push(c),
            }
        }

        if components.is_empty() {
            PathBuf::from(".")
        } else {
            components.iter().collect()
        }
    }

    fn find_upwards(&self, from: &Path, file_name: &str) -> Option<PathBuf> {
        let mut current = if from.is_file() {
            from.parent()?.to_path_buf()
        } else {
            from.to_path_buf()
        };

        loop {
            let candidate = current.join(file_name);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        path.metadata()
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}
