use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["py", "pyw"];

/// Finds the source files of Python modules by walking search-path roots.
///
/// A plain name (`mime`) matches recursively: module files by
/// case-insensitive prefix (`**/mime*.py`), package directories only by
/// exact, case-sensitive name (`**/mime/__init__.py`). A dotted name
/// (`email.mime`) descends the package directories first and matches the
/// last part inside them, also accepting an exact module file for a package
/// part (`os.path` finds `os.py`).
#[derive(Debug, Clone)]
pub struct ModuleSearch {
    roots: Vec<PathBuf>,
    first_match: bool,
}

impl ModuleSearch {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut unique = Vec::with_capacity(roots.len());
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        Self {
            roots: unique,
            first_match: false,
        }
    }

    /// Stop after the first hit
    pub fn first_match(mut self, first_match: bool) -> Self {
        self.first_match = first_match;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn find(&self, module: &str) -> Vec<PathBuf> {
        let module = module.trim();
        let mut parts: Vec<&str> = module.split('.').collect();
        let Some(name) = parts.pop().filter(|name| !name.is_empty()) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for root in self.roots.iter().filter(|root| root.is_dir()) {
            if parts.is_empty() {
                self.free_search(root, name, &mut found);
            } else {
                self.package_search(root, name, &parts, &mut found);
            }
            if self.done(&found) {
                break;
            }
        }
        debug!("Module search for {:?} found {} files", module, found.len());
        found
    }

    fn done(&self, found: &[PathBuf]) -> bool {
        self.first_match && !found.is_empty()
    }

    /// Another root nested inside the one being walked gets its own pass
    fn is_other_root(&self, dir: &Path) -> bool {
        self.roots.iter().any(|root| root == dir)
    }

    fn free_search(&self, root: &Path, name: &str, found: &mut Vec<PathBuf>) {
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if self.is_other_root(entry.path()) {
                    walker.skip_current_dir();
                    continue;
                }
                let init = entry.path().join("__init__.py");
                if file_name == name && init.is_file() {
                    found.push(init);
                    walker.skip_current_dir();
                }
            } else if entry.file_type().is_file() && is_prefix_match(&file_name, name) {
                found.push(entry.path().to_path_buf());
            }

            if self.done(found) {
                return;
            }
        }
    }

    fn package_search(&self, dir: &Path, name: &str, packages: &[&str], found: &mut Vec<PathBuf>) {
        let package = packages.first().copied();
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok());

        for entry in entries {
            let file_name = entry.file_name().to_string_lossy();
            let path = entry.path();

            if entry.file_type().is_file() {
                let matched = match package {
                    None => is_prefix_match(&file_name, name),
                    Some(package) => is_exact_match(&file_name, package),
                };
                if matched {
                    found.push(path.to_path_buf());
                }
            } else if entry.file_type().is_dir() && !self.is_other_root(path) {
                let init = path.join("__init__.py");
                if package.is_none() && file_name == name && init.is_file() {
                    found.push(init);
                    break;
                } else if Some(&*file_name) == package {
                    self.package_search(path, name, &packages[1..], found);
                }
            }

            if self.done(found) {
                return;
            }
        }
    }
}

fn split_source(file_name: &str) -> Option<&str> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    SOURCE_EXTENSIONS.contains(&extension).then_some(stem)
}

fn is_prefix_match(file_name: &str, name: &str) -> bool {
    split_source(file_name).is_some_and(|stem| {
        stem.to_lowercase().starts_with(&name.to_lowercase())
    })
}

fn is_exact_match(file_name: &str, name: &str) -> bool {
    split_source(file_name) == Some(name)
}
