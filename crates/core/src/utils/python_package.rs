use std::path::{Path, PathBuf};

use crate::interfaces::PathResolver;

/// Where a Python source file sits relative to the top of its package tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRoot {
    /// First directory above the file that is not itself a package
    pub root: PathBuf,
    /// Path of the file relative to `root`
    pub relative: PathBuf,
}

impl PackageRoot {
    /// Climb out of every directory containing `__init__.py`, so tools run
    /// from `root` can import the file by its dotted module name.
    pub fn locate(file: &Path, resolver: &dyn PathResolver) -> Self {
        let absolute = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
        let absolute = resolver.normalize(&absolute);

        let mut relative = PathBuf::from(absolute.file_name().unwrap_or(absolute.as_os_str()));
        let mut root = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        while resolver.is_file(&root.join("__init__.py")) {
            let (Some(name), Some(parent)) = (root.file_name(), root.parent()) else {
                break;
            };
            relative = Path::new(name).join(&relative);
            root = parent.to_path_buf();
        }

        Self { root, relative }
    }

    pub fn module_path(&self) -> String {
        module_path(&self.relative)
    }
}

/// Dotted module name for a package-relative source path
pub fn module_path(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DefaultPathResolver;
    use tempfile::TempDir;

    #[test]
    fn test_locate_climbs_out_of_packages() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("app").join("models");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(temp_dir.path().join("app").join("__init__.py"), "").unwrap();
        std::fs::write(pkg.join("__init__.py"), "").unwrap();
        let file = pkg.join("user.py");
        std::fs::write(&file, "").unwrap();

        let root = PackageRoot::locate(&file, &DefaultPathResolver::new());
        assert_eq!(root.root, DefaultPathResolver::new().normalize(temp_dir.path()));
        assert_eq!(root.relative, PathBuf::from("app/models/user.py"));
        assert_eq!(root.module_path(), "app.models.user");
    }

    #[test]
    fn test_locate_plain_script() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("script.py");
        std::fs::write(&file, "").unwrap();

        let root = PackageRoot::locate(&file, &DefaultPathResolver::new());
        assert_eq!(root.relative, PathBuf::from("script.py"));
        assert_eq!(root.module_path(), "script");
    }
}
