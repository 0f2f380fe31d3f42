use std::path::PathBuf;

use crate::{
    error::{Error, Result},
    types::CapturedOutput,
};

/// Python snippet that prints the interpreter's module search path as JSON
pub const SYS_PATH_SCRIPT: &str = "import json, sys; print(json.dumps(sys.path))";

/// Read the JSON array printed by [`SYS_PATH_SCRIPT`]. Empty entries (the
/// interpreter's "current directory" marker) are dropped.
pub fn parse_sys_path(output: &CapturedOutput) -> Result<Vec<PathBuf>> {
    let stdout = output.stdout_text();
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| line.starts_with('['))
        .ok_or_else(|| {
            let stderr = output.stderr_text();
            let detail = stderr
                .lines()
                .map(str::trim)
                .rfind(|line| !line.is_empty())
                .unwrap_or("no search path printed");
            Error::OutputParseAnomaly(detail.to_string())
        })?;

    let entries: Vec<String> = serde_json::from_str(line)
        .map_err(|e| Error::OutputParseAnomaly(format!("unreadable search path: {e}")))?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect())
}
