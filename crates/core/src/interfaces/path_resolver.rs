//! Path resolution interface
//!
//! Abstracts the filesystem queries the resolver and checkers make so they
//! can be exercised without touching real interpreter installs.

use std::path::{Path, PathBuf};

/// Trait for path resolution operations
pub trait PathResolver: Send + Sync {
    /// Resolve a relative path against a base path
    fn resolve_relative(&self, base: &Path, relative: &Path) -> PathBuf;

    /// Normalize a path (remove .., ., etc.) without touching the filesystem
    fn normalize(&self, path: &Path) -> PathBuf;

    /// Walk up from `from` (exclusive of a file, inclusive of a directory)
    /// looking for `file_name`
    fn find_upwards(&self, from: &Path, file_name: &str) -> Option<PathBuf>;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a file the current user may execute
    fn is_executable(&self, path: &Path) -> bool;
}
