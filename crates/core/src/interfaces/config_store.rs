//! Configuration surface consumed by the resolver and checkers

use crate::types::ToolName;
use std::path::PathBuf;
use std::sync::Arc;

/// Key-value configuration supplied by the host application.
///
/// Absence of a value is a valid state: an unconfigured interpreter makes
/// the resolver fall back to `PATH`, never an error on its own.
pub trait ConfigStore: Send + Sync {
    /// Configured interpreter path for `tool`
    fn interpreter_path(&self, tool: ToolName) -> Option<PathBuf>;

    /// Extra arguments appended to the tool command line
    fn extra_args(&self, _tool: ToolName) -> Vec<String> {
        Vec::new()
    }

    /// Message ids disabled for the linter
    fn disabled_checks(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether saving a file triggers a compile check
    fn compile_on_save(&self) -> bool {
        true
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn interpreter_path(&self, tool: ToolName) -> Option<PathBuf> {
        (**self).interpreter_path(tool)
    }

    fn extra_args(&self, tool: ToolName) -> Vec<String> {
        (**self).extra_args(tool)
    }

    fn disabled_checks(&self) -> Vec<String> {
        (**self).disabled_checks()
    }

    fn compile_on_save(&self) -> bool {
        (**self).compile_on_save()
    }
}
