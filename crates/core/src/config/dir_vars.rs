//! Per-directory tool variables (`__dirvar_py__.cfg`)
//!
//! A project can drop this file anywhere above its sources to give the
//! checkers extra module search path entries or a pylint rc file:
//!
//! ```text
//! PYTHONPATH=./lib,../shared
//! PYLINTRC=./pylintrc
//! ```

use crate::{error::Result, interfaces::PathResolver};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DIRVAR_FILE_NAME: &str = "__dirvar_py__.cfg";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryVariables {
    /// The file the variables came from, if one was found
    pub file: Option<PathBuf>,
    /// Absolute module search path entries from `PYTHONPATH`
    pub python_path: Vec<PathBuf>,
    pub pylintrc: Option<PathBuf>,
    /// Every other `KEY=value` line, verbatim
    pub vars: BTreeMap<String, String>,
}

impl DirectoryVariables {
    /// Find and read the variables file governing `target`.
    /// Missing file means empty variables.
    pub fn load_for(target: &Path, resolver: &dyn PathResolver) -> Result<Self> {
        let start = target.parent().unwrap_or(target);
        let Some(file) = resolver.find_upwards(start, DIRVAR_FILE_NAME) else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(&file)?;
        tracing::debug!("Using directory variables from {:?}", file);
        Ok(Self::parse(&file, &contents, resolver))
    }

    pub fn parse(file: &Path, contents: &str, resolver: &dyn PathResolver) -> Self {
        let base = file.parent().unwrap_or(Path::new("."));
        let mut vars = Self {
            file: Some(file.to_path_buf()),
            ..Default::default()
        };

        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim_end();

            match key {
                "PYTHONPATH" => vars.python_path.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|entry| !entry.is_empty())
                        .map(|entry| resolver.resolve_relative(base, Path::new(entry))),
                ),
                "PYLINTRC" if !value.trim().is_empty() => {
                    vars.pylintrc = Some(resolver.resolve_relative(base, Path::new(value.trim())));
                }
                "" => {}
                _ => {
                    vars.vars.insert(key.to_string(), value.to_string());
                }
            }
        }

        vars
    }
}
