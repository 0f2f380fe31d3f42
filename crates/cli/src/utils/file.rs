use std::path::{Path, PathBuf};

use checkrunner_core::ToolName;

/// Resolve `path` against the current directory
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Default tool for a file when none was asked for
pub fn infer_tool(path: &Path) -> Option<ToolName> {
    match extension(path)?.as_str() {
        "php" => Some(ToolName::Php),
        "py" | "pyw" => Some(ToolName::Pylint),
        _ => None,
    }
}

/// Whether `tool` can check `path`
pub fn is_source_for(tool: ToolName, path: &Path) -> bool {
    let Some(ext) = extension(path) else {
        return false;
    };
    match tool {
        ToolName::Php => ext == "php",
        ToolName::Pylint | ToolName::Pep8 | ToolName::Compile => ext == "py" || ext == "pyw",
        ToolName::Find => false,
    }
}
